//! Build profile resolution.

/// The single flag distinguishing a development build from a production one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Profile {
    /// Whether this is a production build
    pub production: bool,
}

impl Profile {
    /// Create a profile from the `--production` flag.
    pub fn new(production: bool) -> Self {
        Self { production }
    }

    /// Derive the full switch set for this profile.
    ///
    /// This is the only place switches are decided; tasks consult the
    /// resolved [`Switches`] rather than the flag itself.
    pub fn switches(self) -> Switches {
        Switches {
            source_maps: self.production,
            minify: self.production,
            pretty_templates: !self.production,
            cleanup: self.production,
            strict: self.production,
            restrict_permissions: self.production,
        }
    }
}

/// Named switches derived from the build profile.
///
/// Every field is a direct function of [`Profile::production`]; switches are
/// never set independently of the profile flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switches {
    /// Write `.map` siblings next to compiled outputs
    pub source_maps: bool,

    /// Minify script outputs
    pub minify: bool,

    /// Emit templates as authored instead of whitespace-compacted
    pub pretty_templates: bool,

    /// Run the cleanup task before building
    pub cleanup: bool,

    /// Treat per-file errors as fatal instead of logging and continuing
    pub strict: bool,

    /// Apply restrictive (0644) permissions to script outputs
    pub restrict_permissions: bool,
}
