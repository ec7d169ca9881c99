/// Classification of a single body line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line<'a> {
    /// A `~ label` line. `raw` is the full line (without line ending),
    /// `label` is the text after the `~` and its whitespace.
    Tilde { raw: &'a str, label: &'a str },
    /// Anything else
    Content(&'a str),
}

/// A post body split into alternating content and tilde segments:
/// `contents[0], tildes[0], contents[1], ..., tildes[n-1], contents[n]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segments {
    /// Interstitial text runs, always `tildes.len() + 1` long (entries may be empty)
    pub contents: Vec<String>,
    /// Raw tilde lines in body order
    pub tildes: Vec<String>,
}

impl Segments {
    pub fn tilde_count(&self) -> usize {
        self.tildes.len()
    }
}
