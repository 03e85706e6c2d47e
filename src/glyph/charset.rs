//! Character set definitions for glyph encoding.

/// Simple ASCII density ramp (10 levels).
/// Characters ordered from darkest (space) to brightest (@).
pub const SIMPLE_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Detailed ASCII density ramp (70 levels) for fine tonal gradients.
pub const DETAILED_RAMP: &[char] = &[
    ' ', '.', '\'', '`', '^', '"', ',', ':', ';', 'I', 'l', '!', 'i', '>', '<', '~', '+', '_',
    '-', '?', ']', '[', '}', '{', '1', ')', '(', '|', '\\', '/', 't', 'f', 'j', 'r', 'x', 'n',
    'u', 'v', 'c', 'z', 'X', 'Y', 'U', 'J', 'C', 'L', 'Q', '0', 'O', 'Z', 'm', 'w', 'q', 'p',
    'd', 'b', 'k', 'h', 'a', 'o', '*', '#', 'M', 'W', '&', '8', '%', 'B', '@', '$',
];

/// Block character ramp (5 levels) using Unicode shade blocks.
pub const BLOCKS_RAMP: &[char] = &[' ', '░', '▒', '▓', '█'];

/// Minimal ramp (4 levels) for a clean, low-noise look.
pub const MINIMAL_RAMP: &[char] = &[' ', '.', ':', '#'];

/// How a character set converts pixels to glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodeMode {
    /// One pixel per cell, mapped onto a brightness ramp.
    Luminance,
    /// 2x2 sub-pixel blocks mapped onto quadrant glyphs.
    Quadrant,
    /// 2x4 sub-pixel blocks mapped onto braille patterns.
    Braille,
}

/// Built-in character sets, selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    /// 10-level ASCII density ramp
    #[default]
    Simple,
    /// 70-level ASCII ramp for fine gradients
    Detailed,
    /// Unicode shade blocks (5 levels)
    Blocks,
    /// 4-level clean look
    Minimal,
    /// 2x2 quadrant block glyphs
    Quadrant,
    /// 2x4 braille patterns, highest spatial resolution
    Braille,
}

impl Charset {
    /// Parse a charset from its config-file name.
    pub fn from_str(s: &str) -> Option<Charset> {
        match s.to_lowercase().as_str() {
            "simple" => Some(Charset::Simple),
            "detailed" => Some(Charset::Detailed),
            "blocks" => Some(Charset::Blocks),
            "minimal" => Some(Charset::Minimal),
            "quadrant" => Some(Charset::Quadrant),
            "braille" => Some(Charset::Braille),
            _ => None,
        }
    }

    /// Parse a charset name, falling back to the default ramp when unknown.
    ///
    /// Unknown names are a configuration mistake, not a fatal error: the
    /// effect keeps running with the `simple` ramp and a logged warning.
    pub fn resolve(s: &str) -> Charset {
        match Charset::from_str(s) {
            Some(set) => set,
            None => {
                log::warn!("unknown charset '{}', falling back to '{}'", s, Charset::default());
                Charset::default()
            }
        }
    }

    /// The encode mode this charset selects.
    pub fn mode(&self) -> EncodeMode {
        match self {
            Charset::Quadrant => EncodeMode::Quadrant,
            Charset::Braille => EncodeMode::Braille,
            _ => EncodeMode::Luminance,
        }
    }

    /// The brightness ramp for luminance-mode sets.
    ///
    /// Note: Quadrant and Braille return an empty slice since they map
    /// sub-pixel patterns instead of ramp indices.
    pub fn ramp(&self) -> &'static [char] {
        match self {
            Charset::Simple => SIMPLE_RAMP,
            Charset::Detailed => DETAILED_RAMP,
            Charset::Blocks => BLOCKS_RAMP,
            Charset::Minimal => MINIMAL_RAMP,
            Charset::Quadrant | Charset::Braille => &[],
        }
    }

    /// Cycle to the next character set.
    ///
    /// Order: Simple -> Detailed -> Blocks -> Minimal -> Quadrant -> Braille -> Simple
    pub fn next(&self) -> Self {
        match self {
            Charset::Simple => Charset::Detailed,
            Charset::Detailed => Charset::Blocks,
            Charset::Blocks => Charset::Minimal,
            Charset::Minimal => Charset::Quadrant,
            Charset::Quadrant => Charset::Braille,
            Charset::Braille => Charset::Simple,
        }
    }

    /// Human-readable name, also the config-file spelling.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Simple => "simple",
            Charset::Detailed => "detailed",
            Charset::Blocks => "blocks",
            Charset::Minimal => "minimal",
            Charset::Quadrant => "quadrant",
            Charset::Braille => "braille",
        }
    }

    /// All built-in sets, in listing order.
    pub fn all() -> &'static [Charset] {
        &[
            Charset::Simple,
            Charset::Detailed,
            Charset::Blocks,
            Charset::Minimal,
            Charset::Quadrant,
            Charset::Braille,
        ]
    }
}

impl std::fmt::Display for Charset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ramps_are_nonempty_for_luminance_sets() {
        for set in Charset::all() {
            match set.mode() {
                EncodeMode::Luminance => assert!(!set.ramp().is_empty(), "{}", set),
                _ => assert!(set.ramp().is_empty(), "{}", set),
            }
        }
    }

    #[test]
    fn test_simple_ramp_shape() {
        assert_eq!(SIMPLE_RAMP.len(), 10);
        assert_eq!(SIMPLE_RAMP[0], ' ');
        assert_eq!(SIMPLE_RAMP[9], '@');
    }

    #[test]
    fn test_detailed_ramp_len() {
        assert_eq!(DETAILED_RAMP.len(), 70);
    }

    #[test]
    fn test_from_str_round_trips() {
        for set in Charset::all() {
            assert_eq!(Charset::from_str(set.name()), Some(*set));
        }
        assert_eq!(Charset::from_str("bogus"), None);
    }

    #[test]
    fn test_resolve_falls_back_to_simple() {
        assert_eq!(Charset::resolve("braille"), Charset::Braille);
        assert_eq!(Charset::resolve("no-such-set"), Charset::Simple);
    }

    #[test]
    fn test_next_cycles_through_all() {
        let mut set = Charset::Simple;
        let mut seen = Vec::new();
        for _ in 0..Charset::all().len() {
            seen.push(set);
            set = set.next();
        }
        assert_eq!(set, Charset::Simple);
        assert_eq!(seen.len(), Charset::all().len());
    }
}
