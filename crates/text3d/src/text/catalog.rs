//! Compiled-in font catalog

/// A named font and where its outline data lives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontDescriptor {
    /// Catalog name used for selection
    pub name: &'static str,
    /// Resource location, relative to the font source's root
    pub source_location: &'static str,
}

/// Fonts shipped with the title scene
pub const BUILTIN_FONTS: &[FontDescriptor] = &[
    FontDescriptor {
        name: "minecrafter",
        source_location: "fonts/minecrafter.json",
    },
    FontDescriptor {
        name: "minecrafter-alt",
        source_location: "fonts/minecrafter-alt.json",
    },
];

/// Outcome of resolving a font name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontSelection {
    /// The name matched a catalog entry
    Exact(&'static FontDescriptor),
    /// Unknown name; the first catalog entry was selected instead
    Fallback {
        /// Name that failed to resolve
        requested: String,
        /// Descriptor selected in its place
        descriptor: &'static FontDescriptor,
    },
}

impl FontSelection {
    /// Descriptor that ended up selected
    pub fn descriptor(&self) -> &'static FontDescriptor {
        match self {
            Self::Exact(descriptor) | Self::Fallback { descriptor, .. } => *descriptor,
        }
    }

    /// True when the requested name was not in the catalog
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }
}

/// Error building a catalog
#[derive(Debug, Clone, thiserror::Error)]
#[error("Font catalog must contain at least one font")]
pub struct EmptyCatalogError;

/// Fixed, non-empty list of selectable fonts
#[derive(Debug, Clone, Copy)]
pub struct FontCatalog {
    fonts: &'static [FontDescriptor],
}

impl FontCatalog {
    /// Catalog over a static list; the first entry is the default
    pub fn new(fonts: &'static [FontDescriptor]) -> Result<Self, EmptyCatalogError> {
        if fonts.is_empty() {
            return Err(EmptyCatalogError);
        }
        Ok(Self { fonts })
    }

    /// The built-in catalog
    pub const fn builtin() -> Self {
        Self { fonts: BUILTIN_FONTS }
    }

    /// Default font (first entry)
    pub fn default_font(&self) -> &'static FontDescriptor {
        &self.fonts[0]
    }

    /// Exact lookup by name
    pub fn find(&self, name: &str) -> Option<&'static FontDescriptor> {
        self.fonts.iter().find(|font| font.name == name)
    }

    /// Lenient lookup: unknown names fall back to the default font
    pub fn resolve(&self, name: &str) -> FontSelection {
        match self.find(name) {
            Some(descriptor) => FontSelection::Exact(descriptor),
            None => FontSelection::Fallback {
                requested: name.to_string(),
                descriptor: self.default_font(),
            },
        }
    }

    /// All entries in order
    pub fn iter(&self) -> impl Iterator<Item = &'static FontDescriptor> {
        self.fonts.iter()
    }

    /// Number of fonts
    pub fn len(&self) -> usize {
        self.fonts.len()
    }

    /// Always false; catalogs are non-empty by construction
    pub fn is_empty(&self) -> bool {
        self.fonts.is_empty()
    }
}

impl Default for FontCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
