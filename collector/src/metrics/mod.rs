pub mod catalog;
pub mod descriptor;
pub mod exposition;
pub mod sample;

// Re-export the main types for easy access
pub use descriptor::{
    describe,
    Descriptor,
    NAMESPACE,
};
pub use exposition::{
    Exposition,
    RenderError,
    CONTENT_TYPE,
};
pub use sample::{
    sample_channel,
    Sample,
    SampleSink,
    SampleStream,
    SinkError,
    NO_LABELS,
};
