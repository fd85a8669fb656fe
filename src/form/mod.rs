use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::wire::BusinessSuggestions;

pub const FEATURE_OPTIONS: &[&str] = &[
    "Contact Form", "Blog", "User Login", "E-commerce", "Gallery",
    "Testimonials", "Newsletter Signup", "Social Media Integration",
    "Search Functionality", "Analytics", "Chat Support", "Booking System",
];

pub const PAGE_OPTIONS: &[&str] = &[
    "Home", "About", "Services", "Portfolio", "Blog", "Contact", "Menu",
    "Shop", "FAQ", "Testimonials", "Team", "Pricing", "Privacy Policy",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DesignStyle {
    #[serde(rename = "Minimal & Clean")]
    MinimalClean,
    #[serde(rename = "Modern & Professional")]
    ModernProfessional,
    #[serde(rename = "Colorful & Creative")]
    ColorfulCreative,
    #[serde(rename = "Dark & Elegant")]
    DarkElegant,
    #[serde(rename = "Playful & Fun")]
    PlayfulFun,
    #[serde(rename = "Corporate & Traditional")]
    CorporateTraditional,
}

impl DesignStyle {
    pub const ALL: [DesignStyle; 6] = [
        DesignStyle::MinimalClean,
        DesignStyle::ModernProfessional,
        DesignStyle::ColorfulCreative,
        DesignStyle::DarkElegant,
        DesignStyle::PlayfulFun,
        DesignStyle::CorporateTraditional,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DesignStyle::MinimalClean => "Minimal & Clean",
            DesignStyle::ModernProfessional => "Modern & Professional",
            DesignStyle::ColorfulCreative => "Colorful & Creative",
            DesignStyle::DarkElegant => "Dark & Elegant",
            DesignStyle::PlayfulFun => "Playful & Fun",
            DesignStyle::CorporateTraditional => "Corporate & Traditional",
        }
    }

    /// Case-insensitive match against the style labels.
    pub fn from_label(s: &str) -> Option<Self> {
        let s = s.trim();
        Self::ALL.into_iter().find(|st| st.label().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for DesignStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Insertion-ordered set of catalog values. Unknown values and duplicates
/// are rejected, so a selection can only hold entries of its catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(into = "Vec<String>")]
pub struct Selection {
    catalog: Catalog,
    items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Features,
    Pages,
}

impl Catalog {
    pub fn options(self) -> &'static [&'static str] {
        match self {
            Catalog::Features => FEATURE_OPTIONS,
            Catalog::Pages => PAGE_OPTIONS,
        }
    }

    fn canonical(self, value: &str) -> Option<&'static str> {
        let v = value.trim();
        self.options().iter().copied().find(|o| o.eq_ignore_ascii_case(v))
    }
}

impl Selection {
    pub fn new(catalog: Catalog) -> Self {
        Self { catalog, items: Vec::new() }
    }

    /// Adds `value` if it is in the catalog and not yet selected.
    /// Returns whether the selection changed.
    pub fn insert(&mut self, value: &str) -> bool {
        match self.catalog.canonical(value) {
            Some(v) if !self.items.iter().any(|i| i == v) => {
                self.items.push(v.to_string());
                true
            }
            _ => false,
        }
    }

    pub fn remove(&mut self, value: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| !i.eq_ignore_ascii_case(value.trim()));
        before != self.items.len()
    }

    /// Checkbox semantics: select or deselect.
    pub fn set(&mut self, value: &str, checked: bool) -> bool {
        if checked { self.insert(value) } else { self.remove(value) }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.items.iter().any(|i| i.eq_ignore_ascii_case(value.trim()))
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn catalog(&self) -> Catalog {
        self.catalog
    }
}

impl From<Selection> for Vec<String> {
    fn from(s: Selection) -> Self {
        s.items
    }
}

/// The user's structured answers, edited field by field by the form wizard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormData {
    #[serde(default)]
    pub website_name: String,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default = "empty_features", deserialize_with = "de_features")]
    pub features: Selection,
    #[serde(default)]
    pub design_style: Option<DesignStyle>,
    #[serde(default = "empty_pages", deserialize_with = "de_pages")]
    pub pages: Selection,
    #[serde(default)]
    pub additional_info: String,
}

fn empty_features() -> Selection {
    Selection::new(Catalog::Features)
}

fn empty_pages() -> Selection {
    Selection::new(Catalog::Pages)
}

fn de_selection<'de, D>(d: D, catalog: Catalog) -> Result<Selection, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Vec::<String>::deserialize(d)?;
    let mut sel = Selection::new(catalog);
    for v in &raw {
        if catalog.canonical(v).is_none() {
            return Err(serde::de::Error::custom(format!("'{v}' is not a known option")));
        }
        sel.insert(v);
    }
    Ok(sel)
}

fn de_features<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Selection, D::Error> {
    de_selection(d, Catalog::Features)
}

fn de_pages<'de, D: serde::Deserializer<'de>>(d: D) -> Result<Selection, D::Error> {
    de_selection(d, Catalog::Pages)
}

impl Default for FormData {
    fn default() -> Self {
        Self {
            website_name: String::new(),
            purpose: String::new(),
            target_audience: String::new(),
            features: empty_features(),
            design_style: None,
            pages: empty_pages(),
            additional_info: String::new(),
        }
    }
}

impl FormData {
    /// True when the user has not entered anything yet.
    pub fn is_blank(&self) -> bool {
        self.website_name.trim().is_empty()
            && self.purpose.trim().is_empty()
            && self.target_audience.trim().is_empty()
            && self.features.is_empty()
            && self.design_style.is_none()
            && self.pages.is_empty()
            && self.additional_info.trim().is_empty()
    }

    /// Pre-fill pages, features and style from an analysis result.
    /// Values outside the catalogs are dropped.
    pub fn apply_suggestions(&mut self, s: &BusinessSuggestions) {
        self.pages = empty_pages();
        for p in &s.suggested_pages {
            if !self.pages.insert(p) {
                debug!(page = %p, "dropping suggested page outside catalog");
            }
        }
        self.features = empty_features();
        for f in &s.suggested_features {
            if !self.features.insert(f) {
                debug!(feature = %f, "dropping suggested feature outside catalog");
            }
        }
        if let Some(style) = DesignStyle::from_label(&s.suggested_design_style) {
            self.design_style = Some(style);
        }
    }
}
