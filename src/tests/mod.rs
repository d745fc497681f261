
// Runner tests (pipeline, report layout, token dump)
pub mod runner;

// End-to-end scenarios over the sample targets
pub mod scenarios;
