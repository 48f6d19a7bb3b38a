use clap::Parser;
use ofsextract_mvc::FrameRate;
use std::ffi::OsString;
use std::path::PathBuf;

pub const LICENSE_TEXT: &str = "\
MIT License

Permission is hereby granted, free of charge, to any person obtaining a copy
of this software and associated documentation files (the \"Software\"), to deal
in the Software without restriction, including without limitation the rights
to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
copies of the Software, and to permit persons to whom the Software is
furnished to do so, subject to the following conditions:

The above copyright notice and this permission notice shall be included in all
copies or substantial portions of the Software.

THE SOFTWARE IS PROVIDED \"AS IS\", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
SOFTWARE.";

const FPS_TABLE: &str = "\
FPS conversion table:
  1 : 23.976 fps
  2 : 24 fps
  3 : 25 fps
  4 : 29.97 fps
  6 : 50 fps
  7 : 59.94 fps";

#[derive(Parser, Debug)]
#[command(name = "ofsextract")]
#[command(
    author,
    version,
    about = "Extract 3D-Planes from MVC streams into OFS files",
    after_help = FPS_TABLE
)]
pub struct Cli {
    /// Input stream: raw MVC, H264+MVC, or M2TS. Use `-` for standard input
    pub input: Option<PathBuf>,

    /// Output folder for the OFS files, created if missing
    #[arg(default_value = ".")]
    pub output_dir: PathBuf,

    /// Print license (MIT)
    #[arg(long)]
    pub license: bool,

    /// Override the frame rate read from the stream (1-4, 6 or 7)
    #[arg(long, value_name = "N", value_parser = parse_fps)]
    pub fps: Option<FrameRate>,

    /// Set drop_frame_flag in the OFS files. Only valid with --fps 4
    #[arg(long)]
    pub dropframe: bool,

    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

fn parse_fps(value: &str) -> Result<FrameRate, String> {
    value
        .parse::<u8>()
        .ok()
        .and_then(FrameRate::from_code)
        .ok_or_else(|| {
            format!(
                "'-fps {}' is invalid. Value must be between 1 and 4, 6, or 7",
                value
            )
        })
}

/// Rewrite single-dash long options (`-fps`, `-dropframe`, `-license`) to
/// their `--` forms.
pub fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    args.into_iter()
        .map(|arg| match arg.to_str() {
            Some("-fps") => OsString::from("--fps"),
            Some("-dropframe") => OsString::from("--dropframe"),
            Some("-license") => OsString::from("--license"),
            _ => arg,
        })
        .collect()
}

impl Cli {
    /// Option combinations clap cannot express.
    pub fn check(&self) -> anyhow::Result<()> {
        if self.dropframe && !self.fps.is_some_and(FrameRate::supports_drop_frame) {
            anyhow::bail!("'-dropframe' is only compatible with '-fps 4'.");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let args = std::iter::once("ofsextract")
            .chain(args.iter().copied())
            .map(OsString::from);
        Cli::try_parse_from(normalize_args(args))
    }

    #[test]
    fn test_legacy_flags() {
        let cli = parse(&["in.mvc", "out", "-fps", "4", "-dropframe"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("in.mvc")));
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.fps, Some(FrameRate::Fps29_97));
        assert!(cli.dropframe);
        assert!(cli.check().is_ok());

        assert!(parse(&["-license"]).unwrap().license);
    }

    #[test]
    fn test_output_dir_defaults_to_current() {
        let cli = parse(&["in.mvc"]).unwrap();
        assert_eq!(cli.output_dir, PathBuf::from("."));
        assert_eq!(cli.fps, None);
    }

    #[test]
    fn test_invalid_fps() {
        assert!(parse(&["in.mvc", "-fps", "5"]).is_err());
        assert!(parse(&["in.mvc", "-fps", "x"]).is_err());
        assert!(parse(&["in.mvc", "-fps"]).is_err());
    }

    #[test]
    fn test_dropframe_requires_fps_4() {
        assert!(parse(&["in.mvc", "-dropframe"]).unwrap().check().is_err());
        assert!(parse(&["in.mvc", "-fps", "1", "-dropframe"])
            .unwrap()
            .check()
            .is_err());
    }

    #[test]
    fn test_stdin_input() {
        let cli = parse(&["-", "out"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("-")));
    }
}
