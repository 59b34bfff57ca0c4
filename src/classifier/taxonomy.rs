use crate::config::BrandEntry;

/// Built-in brands: canonical name and the spellings dealers use for it
const AUTOMOTIVE_BRANDS: &[(&str, &[&str])] = &[
    ("ford", &["ford"]),
    ("chevrolet", &["chevrolet", "chevy"]),
    ("gmc", &["gmc"]),
    ("buick", &["buick"]),
    ("cadillac", &["cadillac", "caddy"]),
    ("lincoln", &["lincoln"]),
    ("chrysler", &["chrysler"]),
    ("dodge", &["dodge"]),
    ("jeep", &["jeep"]),
    ("ram", &["ram"]),
    ("toyota", &["toyota"]),
    ("honda", &["honda"]),
    ("nissan", &["nissan"]),
    ("mazda", &["mazda"]),
    ("subaru", &["subaru"]),
    ("mitsubishi", &["mitsubishi"]),
    ("lexus", &["lexus"]),
    ("acura", &["acura"]),
    ("infiniti", &["infiniti"]),
    ("hyundai", &["hyundai"]),
    ("kia", &["kia"]),
    ("genesis", &["genesis"]),
    ("volkswagen", &["volkswagen", "vw"]),
    ("audi", &["audi"]),
    ("bmw", &["bmw"]),
    ("mercedes-benz", &["mercedes-benz", "mercedes", "benz", "mb"]),
    ("porsche", &["porsche"]),
    ("volvo", &["volvo"]),
    ("jaguar", &["jaguar", "jag"]),
    ("land rover", &["land rover", "landrover", "rover"]),
    ("mini", &["mini"]),
    ("fiat", &["fiat"]),
    ("alfa romeo", &["alfa romeo", "alfa"]),
    ("tesla", &["tesla"]),
    ("rivian", &["rivian"]),
    ("lucid", &["lucid"]),
    ("polestar", &["polestar"]),
];

/// Variants too short or too common to identify a dealer from a hostname
/// alone (`program.com` is not a Ram store)
const HOST_AMBIGUOUS_VARIANTS: &[&str] =
    &["ram", "mini", "mb", "vw", "jag", "caddy", "rover", "alfa"];

/// Manufacturer corporate sites whose hostnames don't follow `<brand>.com`
const EXTRA_MANUFACTURER_DOMAINS: &[&str] = &[
    "*.chevy.com",
    "*.vw.com",
    "*.mbusa.com",
    "*.landroverusa.com",
    "*.alfaromeousa.com",
    "*.ramtrucks.com",
    "*.miniusa.com",
];

/// One brand with its lowercase spellings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Brand {
    pub canonical: String,
    pub variants: Vec<String>,
}

/// A brand found in a token sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrandMatch<'a> {
    pub canonical: &'a str,
    /// Number of tokens the matched variant spans
    pub len: usize,
}

/// Immutable map from canonical brand name to spelling variants
///
/// Built once and shared read-only by the classifier rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandTaxonomy {
    brands: Vec<Brand>,
    /// (tokenized variant, brand index), longest variants first
    token_variants: Vec<(Vec<String>, usize)>,
}

impl BrandTaxonomy {
    /// The built-in automotive brand list
    pub fn builtin() -> Self {
        Self::with_extra(&[])
    }

    /// The built-in list plus brands from configuration
    ///
    /// A configured brand whose canonical name already exists adds its
    /// variants to that brand.
    pub fn with_extra(extra: &[BrandEntry]) -> Self {
        let mut brands: Vec<Brand> = AUTOMOTIVE_BRANDS
            .iter()
            .map(|(canonical, variants)| Brand {
                canonical: canonical.to_string(),
                variants: variants.iter().map(|v| v.to_string()).collect(),
            })
            .collect();

        for entry in extra {
            let canonical = entry.canonical.trim().to_lowercase();
            let mut variants: Vec<String> = entry
                .variants
                .iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect();
            if !variants.contains(&canonical) {
                variants.insert(0, canonical.clone());
            }

            match brands.iter_mut().find(|b| b.canonical == canonical) {
                Some(existing) => {
                    for variant in variants {
                        if !existing.variants.contains(&variant) {
                            existing.variants.push(variant);
                        }
                    }
                }
                None => brands.push(Brand {
                    canonical,
                    variants,
                }),
            }
        }

        Self::from_brands(brands)
    }

    fn from_brands(brands: Vec<Brand>) -> Self {
        let mut token_variants: Vec<(Vec<String>, usize)> = brands
            .iter()
            .enumerate()
            .flat_map(|(index, brand)| {
                brand
                    .variants
                    .iter()
                    .map(move |variant| (tokenize(variant), index))
            })
            .filter(|(tokens, _)| !tokens.is_empty())
            .collect();

        // longest spelling wins ("land rover" before "rover")
        token_variants.sort_by(|a, b| b.0.len().cmp(&a.0.len()));

        Self {
            brands,
            token_variants,
        }
    }

    pub fn brands(&self) -> &[Brand] {
        &self.brands
    }

    /// Matches a brand variant starting at `tokens[start]`
    pub fn match_at<S: AsRef<str>>(&self, tokens: &[S], start: usize) -> Option<BrandMatch<'_>> {
        self.token_variants.iter().find_map(|(variant, index)| {
            let end = start + variant.len();
            if end > tokens.len() {
                return None;
            }
            let matches = tokens[start..end]
                .iter()
                .zip(variant)
                .all(|(token, expected)| token.as_ref() == expected);
            matches.then(|| BrandMatch {
                canonical: &self.brands[*index].canonical,
                len: variant.len(),
            })
        })
    }

    /// Variants usable inside a hostname label, with spaces and hyphens
    /// removed (`land rover` becomes `landrover`)
    pub fn host_variants(&self) -> impl Iterator<Item = String> + '_ {
        self.brands
            .iter()
            .flat_map(|brand| brand.variants.iter())
            .filter(|variant| !HOST_AMBIGUOUS_VARIANTS.contains(&variant.as_str()))
            .map(|variant| compact(variant))
            .filter(|variant| variant.len() >= 3)
    }

    /// Wildcard patterns for the manufacturers' own sites (`*.ford.com`)
    pub fn manufacturer_domains(&self) -> Vec<String> {
        let mut domains: Vec<String> = self
            .brands
            .iter()
            .map(|brand| format!("*.{}.com", compact(&brand.canonical)))
            .collect();
        domains.extend(EXTRA_MANUFACTURER_DOMAINS.iter().map(|d| d.to_string()));
        domains
    }
}

impl Default for BrandTaxonomy {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Splits text into lowercase alphanumeric tokens
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}
