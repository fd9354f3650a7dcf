use anyhow::Result;
use log::error;
use plotters::prelude::RGBColor;

pub static FONT_SIZE: i32 = 22;
pub static STROKE_WIDTH: u32 = 2;
pub static MARKER_SIZE: u32 = 5;

pub fn get_color_from_label(label: &str) -> Result<RGBColor> {
    match label {
        "dark-blue" | "observed" => Ok(RGBColor(1, 6, 130)),
        "red" | "reference" => Ok(RGBColor(214, 39, 40)),
        "light-grey" | "grid" => Ok(RGBColor(220, 220, 220)),
        _ => {
            error!("unrecognized label for color (label={label})");
            anyhow::bail!("unrecognized label (label={label})");
        }
    }
}
