//! Prompt composition.
//!
//! Turns a validated [`GenerationRequest`] into the single text prompt sent
//! to the image model. The clause order and wording are fixed; changing them
//! changes generated output for every user.

use super::request::GenerationRequest;
use serde::{Deserialize, Serialize};

// ============================================================================
// Styles
// ============================================================================

/// Visual direction selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Style {
    Tech,
    Flashy,
    Modern,
    Playful,
    Abstract,
    Minimal,
}

impl Style {
    pub const ALL: [Style; 6] = [
        Style::Tech,
        Style::Flashy,
        Style::Modern,
        Style::Playful,
        Style::Abstract,
        Style::Minimal,
    ];

    /// The fixed descriptive clause inserted into the prompt.
    pub fn clause(self) -> &'static str {
        match self {
            Style::Flashy => "Professional and impactful corporate design with modern dynamic elements. Use bright professional colors with refined metallic accents and clean glossy finishes.",
            Style::Tech => "Professional tech-focused design with precise geometric elements. Clean, high-contrast layout with subtle depth effects and modern typography.",
            Style::Modern => "Contemporary business design utilizing clean geometric shapes and professional layout. Emphasize whitespace and subtle gradients for a refined corporate look.",
            Style::Playful => "Approachable business design with friendly geometric elements. Use professional color combinations and smooth curved shapes for an inviting corporate identity.",
            Style::Abstract => "Contemporary corporate design using refined geometric patterns. Professional composition with clean shapes and business-appropriate artistic elements.",
            Style::Minimal => "Elegant corporate design focusing on simplicity and clarity. Single-color professional layout with strategic use of whitespace and refined typography.",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Style::Tech => "Tech",
            Style::Flashy => "Flashy",
            Style::Modern => "Modern",
            Style::Playful => "Playful",
            Style::Abstract => "Abstract",
            Style::Minimal => "Minimal",
        }
    }
}

impl std::str::FromStr for Style {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Style::ALL
            .into_iter()
            .find(|style| style.as_str() == s)
            .ok_or_else(|| format!("unknown style: {s}"))
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Composition
// ============================================================================

const PREAMBLE: &str = "Create a professional, clean, family-friendly business logo that is strictly safe for work and absolutely must not contain any adult, inappropriate, offensive, or NSFW content. Generate a single, high-quality, award-winning corporate design suitable for both digital and print media. The logo should only contain simple vector shapes and typography,";

fn is_hex(color: &str) -> bool {
    color.starts_with('#')
}

/// Color instructions for the primary and background colors.
///
/// `#`-prefixed values are echoed exactly; named colors are lower-cased.
pub fn color_instructions(primary: &str, background: &str) -> String {
    let primary = if is_hex(primary) {
        format!("the exact color {primary}")
    } else {
        primary.to_lowercase()
    };
    let background = if is_hex(background) {
        format!("Use exactly {background}")
    } else {
        format!("Use {}", background.to_lowercase())
    };

    format!(
        "The logo must strictly use {primary} as the primary/dominant color for the main elements. \
         {background} as the background color. \
         Maintain strong contrast between the logo elements and background. \
         If accent colors are needed, derive them from the primary color while maintaining color harmony. \
         Ensure the colors are precisely as specified for consistent branding."
    )
}

/// Build the generation prompt. Pure: equal requests give equal prompts.
pub fn compose(request: &GenerationRequest) -> String {
    let mut prompt = format!(
        "{preamble} {style}\n\n{colors}\n\n\
         The company name is {name}, make sure to include the company name in the logo in a professional business font. \
         Keep the design clean, corporate, and family-friendly. \
         Ensure all elements are appropriate for a professional business context.",
        preamble = PREAMBLE,
        style = request.style.clause(),
        colors = color_instructions(&request.primary_color, &request.background_color),
        name = request.company_name,
    );

    if !request.additional_info.is_empty() {
        prompt.push_str(" Additional design context: ");
        prompt.push_str(&request.additional_info);
    }

    prompt
}
