mod run;

pub use run::RunConfiguration;
