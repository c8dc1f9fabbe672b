pub mod controls;
pub mod header;
pub mod loading;
pub mod status_bar;
