//! Configuration record, factory registry and the configurator joining them

pub mod configuration;
pub mod configurator;
pub mod registry;

pub use configuration::{Configuration, PROPERTY_PREFIX};
pub use configurator::resolve;
pub use registry::{AppenderFactory, FactoryRegistry, FormatterFactory};
