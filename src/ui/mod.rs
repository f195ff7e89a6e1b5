/// eframe views: the loop plot and the surrounding panels.
pub mod panels;
pub mod plot;
