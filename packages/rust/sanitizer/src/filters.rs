//! Built-in auto filter table.
//!
//! Literals commonly left behind by web-novel readers: navigation buttons,
//! comment/share widgets, ad banners, and genre tags. Matching is
//! case-insensitive and purely literal.

/// Built-in auto filters, applied in this order.
pub const AUTO_FILTERS: &[&str] = &[
    // Navigation buttons
    "Prev Chapter",
    "Previous Chapter",
    "Next Chapter",
    "Chapitre précédent",
    "Chapitre suivant",
    "Précédent",
    "Suivant",
    // Reader interface
    "Report chapter",
    "Send Gift",
    "Vote",
    "commentVote",
    "leftSEND GIFT",
    // Keyboard hints
    "Tip: You can use left, right, A and D keyboard keys to browse between chapters.",
    "You can use left, right, A and D keyboard keys to browse between chapters",
    "Use arrow keys to navigate",
    // Comments and sharing
    "Comments",
    "COMMENT",
    "Please enable JavaScript to view the",
    "comments powered by Disqus",
    "Disqus",
    "Share",
    "Partager",
    "Like",
    "Tweet",
    // Ads and subscriptions
    "Advertisement",
    "Publicité",
    "Subscribe",
    "Abonnez-vous",
    "Follow us",
    "Suivez-nous",
    // Social networks
    "Facebook",
    "Twitter",
    "Instagram",
    "Share on",
    "Partager sur",
    // Calls to action
    "Read more",
    "Lire la suite",
    "Click here",
    "Cliquez ici",
    "Sign in",
    "Connexion",
    "Register",
    "S'inscrire",
    // Script residue
    "powered by",
    "ref_noscript",
    "noscript",
    "Enable JavaScript",
    // Layout fragments
    "left",
    "right",
    "top",
    "bottom",
    // Genre tags
    "Novel",
    "Xianxia",
    "Fantasy",
    "Romance",
    "Action",
    "Adventure",
    "Drama",
    "Sci-Fi",
    "Mystery",
    "Thriller",
    "Horror",
    "Comedy",
];

/// The auto filter table in effect for a process.
///
/// Built once at startup (built-ins plus configured extras) and shared by
/// every crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSet {
    literals: Vec<String>,
}

impl FilterSet {
    /// The built-in table.
    pub fn builtin() -> Self {
        Self {
            literals: AUTO_FILTERS.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    /// An empty table.
    pub fn empty() -> Self {
        Self {
            literals: Vec::new(),
        }
    }

    /// Append extra literals after the existing ones.
    pub fn with_extra(mut self, extra: impl IntoIterator<Item = String>) -> Self {
        self.literals.extend(extra);
        self
    }

    /// All literals, in application order.
    pub fn literals(&self) -> &[String] {
        &self.literals
    }

    pub fn len(&self) -> usize {
        self.literals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }
}

impl Default for FilterSet {
    fn default() -> Self {
        Self::builtin()
    }
}
