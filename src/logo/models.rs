use serde::Serialize;

/// Model used when a request does not name one.
pub const DEFAULT_MODEL_ID: &str = "black-forest-labs/FLUX.1.1-pro";

/// A generation model the gateway is willing to forward requests to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelEntry {
    pub name: &'static str,
    pub organization: &'static str,
    pub model_id: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_steps: Option<u32>,
    pub requires_reference_image: bool,
}

impl ModelEntry {
    const fn new(name: &'static str, organization: &'static str, model_id: &'static str) -> Self {
        Self {
            name,
            organization,
            model_id,
            default_steps: None,
            requires_reference_image: false,
        }
    }

    const fn steps(mut self, steps: u32) -> Self {
        self.default_steps = Some(steps);
        self
    }

    const fn reference_image(mut self) -> Self {
        self.requires_reference_image = true;
        self
    }
}

const BFL: &str = "Black Forest Labs";

static MODELS: [ModelEntry; 9] = [
    ModelEntry::new(
        "Flux.1 [schnell] (free)",
        BFL,
        "black-forest-labs/FLUX.1-schnell-Free",
    ),
    ModelEntry::new(
        "Flux.1 [schnell] (Turbo)",
        BFL,
        "black-forest-labs/FLUX.1-schnell",
    )
    .steps(4),
    ModelEntry::new("Flux.1 Dev", BFL, "black-forest-labs/FLUX.1-dev").steps(28),
    ModelEntry::new("Flux.1 Canny", BFL, "black-forest-labs/FLUX.1-canny")
        .steps(28)
        .reference_image(),
    ModelEntry::new("Flux.1 Depth", BFL, "black-forest-labs/FLUX.1-depth")
        .steps(28)
        .reference_image(),
    ModelEntry::new("Flux.1 Redux", BFL, "black-forest-labs/FLUX.1-redux")
        .steps(28)
        .reference_image(),
    ModelEntry::new("Flux1.1 [pro]", BFL, "black-forest-labs/FLUX.1.1-pro"),
    ModelEntry::new("Flux.1 [pro]", BFL, "black-forest-labs/FLUX.1-pro"),
    ModelEntry::new(
        "Stable Diffusion XL 1.0",
        "Stability AI",
        "stabilityai/stable-diffusion-xl-base-1.0",
    ),
];

/// The full catalog, in display order.
pub fn all() -> &'static [ModelEntry] {
    &MODELS
}

/// Find a model by its provider id. `None` means the client asked for a
/// model the gateway does not offer.
pub fn lookup(model_id: &str) -> Option<&'static ModelEntry> {
    MODELS.iter().find(|m| m.model_id == model_id)
}
