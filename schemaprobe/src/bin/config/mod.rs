mod probe;

pub use probe::ProbeOptions;
