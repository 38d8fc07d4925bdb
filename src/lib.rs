pub mod drilldown;
pub mod entry;
pub mod input;
pub mod layout;
pub mod navigation;
pub mod server;
pub mod source;
pub mod transition;
pub mod wire;
pub mod zoom;
