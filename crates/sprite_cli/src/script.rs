use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// One scripted session trigger.
#[derive(Clone, Debug, PartialEq)]
pub enum Trigger {
    SelectPalette(usize),
    ToggleAnimation,
    ToggleDistortion,
    ToggleRotation,
    /// Elapsed time fed into one update step.
    Tick(Duration),
    ExportStill(PathBuf),
    ExportAnimation(PathBuf),
    ExportCanvas(PathBuf),
}

impl FromStr for Trigger {
    type Err = String;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let text = text.trim();
        if let Ok(index) = text.parse::<usize>() {
            return Ok(Trigger::SelectPalette(index));
        }

        match text.split_once(':') {
            None => match text.to_ascii_lowercase().as_str() {
                "anim" | "space" => Ok(Trigger::ToggleAnimation),
                "wave" | "w" => Ok(Trigger::ToggleDistortion),
                "rotate" | "r" => Ok(Trigger::ToggleRotation),
                _ => Err(format!("unknown trigger {:?}", text)),
            },
            Some(("tick", seconds)) => {
                let seconds: f64 =
                    seconds.parse().map_err(|_| format!("invalid tick duration {:?}", seconds))?;
                Duration::try_from_secs_f64(seconds)
                    .map(Trigger::Tick)
                    .map_err(|err| format!("invalid tick duration {}: {}", seconds, err))
            },
            Some((_, "")) => Err(format!("missing path in {:?}", text)),
            Some(("still", path)) => Ok(Trigger::ExportStill(path.into())),
            Some(("gif", path)) => Ok(Trigger::ExportAnimation(path.into())),
            Some(("canvas", path)) => Ok(Trigger::ExportCanvas(path.into())),
            Some((kind, _)) => Err(format!("unknown trigger {:?}", kind)),
        }
    }
}
