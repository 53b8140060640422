/// Command-line switches understood by the loop itself.
///
/// These follow the single-dash conventions of classic simulation viewers; the program
/// on top defines no flags of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopArgs {
    pub start_paused: bool,
    pub textures: bool,
}

impl Default for LoopArgs {
    fn default() -> Self {
        Self {
            start_paused: false,
            textures: true,
        }
    }
}

impl LoopArgs {
    /// Parse switches, skipping the program name. Unknown arguments are logged and ignored.
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut parsed = Self::default();
        for arg in args.into_iter().skip(1) {
            match arg.as_ref() {
                "-pause" => parsed.start_paused = true,
                "-notex" => parsed.textures = false,
                other => log::warn!("ignoring unknown argument {other:?}"),
            }
        }
        parsed
    }

    pub fn from_env() -> Self {
        Self::parse(std::env::args())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn no_arguments_gives_defaults() {
        assert_eq!(LoopArgs::parse(["shape-demo"]), LoopArgs::default());
    }

    #[test]
    fn recognises_pause_and_notex() {
        let args = LoopArgs::parse(["shape-demo", "-notex", "-pause"]);
        assert_eq!(
            args,
            LoopArgs {
                start_paused: true,
                textures: false,
            }
        );
    }

    #[test]
    fn unknown_arguments_are_ignored() {
        let args = LoopArgs::parse(["shape-demo", "--fullscreen", "-pause"]);
        assert!(args.start_paused);
        assert!(args.textures);
    }
}
