//! Static model and image-size catalog.
//!
//! The hosted service has no public endpoint that lists its models, so the
//! catalog is maintained by hand. Check fal.ai/models for new releases.

use crate::error::CatalogError;
use serde::Serialize;

/// Model used for new prompt entries unless configured otherwise.
pub const DEFAULT_MODEL: &str = "fal-ai/flux-pro/v1.1";

/// Size preset used for new prompt entries unless configured otherwise.
pub const DEFAULT_SIZE: &str = "landscape_4_3";

/// Prompt counts offered when entering prompts by hand.
pub const PROMPT_COUNT_CHOICES: &[usize] = &[1, 2, 3, 4, 5, 6, 9, 12];

/// A text-to-image model offered by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Step count for few-step models; `None` uses the configured default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inference_steps: Option<u32>,
}

/// An output size preset understood by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SizeDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub width: u32,
    pub height: u32,
}

impl SizeDescriptor {
    /// Dimensions as shown next to the preset name, e.g. `1024x768`.
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

const fn model(id: &'static str, name: &'static str, description: &'static str) -> ModelDescriptor {
    ModelDescriptor {
        id,
        name,
        description,
        inference_steps: None,
    }
}

pub const MODELS: &[ModelDescriptor] = &[
    // FLUX family
    model(
        "fal-ai/flux-pro/v1.1-ultra",
        "FLUX Pro 1.1 Ultra",
        "Latest FLUX with 2K resolution and improved photo realism",
    ),
    model(
        "fal-ai/flux-pro/v1.1",
        "FLUX Pro 1.1",
        "Enhanced image generation with superior composition",
    ),
    model(
        "fal-ai/flux-pro/new",
        "FLUX Pro New",
        "Accelerated version with faster generation",
    ),
    model(
        "fal-ai/flux-pro",
        "FLUX Pro",
        "High-quality professional image generation",
    ),
    model(
        "fal-ai/flux-pro/kontext",
        "FLUX Pro Kontext",
        "Context-aware image generation",
    ),
    model(
        "fal-ai/flux/dev",
        "FLUX Dev",
        "Development version with guidance distillation",
    ),
    ModelDescriptor {
        id: "fal-ai/flux/schnell",
        name: "FLUX Schnell",
        description: "1-4 step generation optimized for speed",
        inference_steps: Some(4),
    },
    model(
        "fal-ai/flux-realism",
        "FLUX Realism",
        "Specialized for hyper-realistic images",
    ),
    model("fal-ai/flux-lora", "FLUX LoRA", "FLUX with custom LoRA support"),
    // Google
    model(
        "fal-ai/imagen4/preview",
        "Imagen 4 (Preview)",
        "Google's latest text-to-image model",
    ),
    // Ideogram (text in images)
    model(
        "fal-ai/ideogram/v2",
        "Ideogram v2",
        "Advanced text rendering in images",
    ),
    model(
        "fal-ai/ideogram/v2-turbo",
        "Ideogram v2 Turbo",
        "Fast text rendering generation",
    ),
    // Specialized
    model(
        "fal-ai/recraft-v3",
        "Recraft V3",
        "SOTA model for vector art, brand styles, and long texts",
    ),
    model(
        "fal-ai/aura-flow",
        "AuraFlow v0.3",
        "State-of-the-art flow-based generation",
    ),
    model(
        "fal-ai/hidream-i1-full",
        "HiDream I1 Full",
        "High-quality dream-like image generation",
    ),
    // Stable Diffusion family
    model(
        "fal-ai/stable-diffusion-v35-large",
        "SD 3.5 Large",
        "Large MMDiT model with improved quality",
    ),
    model(
        "fal-ai/stable-diffusion-v35-medium",
        "SD 3.5 Medium",
        "Balanced model with good speed and quality",
    ),
    model(
        "fal-ai/stable-diffusion-v3-medium",
        "SD 3 Medium",
        "Versatile Stable Diffusion 3 model",
    ),
    // Fast models
    model(
        "fal-ai/pixart-sigma",
        "PixArt Sigma",
        "4K text-to-image generation",
    ),
    model(
        "fal-ai/realistic-vision",
        "Realistic Vision",
        "Focused on realistic image generation",
    ),
    model("fal-ai/fast-sdxl", "Fast SDXL", "High-speed SDXL generation"),
    model(
        "fal-ai/fast-turbo-diffusion",
        "Fast Turbo Diffusion",
        "Ultra-fast generation with turbo model",
    ),
    ModelDescriptor {
        id: "fal-ai/hyper-sdxl",
        name: "Hyper SDXL",
        description: "Hyper-fast SDXL with 1-step generation",
        inference_steps: Some(1),
    },
    // Other
    model(
        "fal-ai/omnigen-v1",
        "OmniGen",
        "Multi-modal generation with editing capabilities",
    ),
    model(
        "fal-ai/fooocus",
        "Fooocus",
        "Optimized parameters for quality improvements",
    ),
    model("fal-ai/kolors", "Kolors", "Photorealistic image generation"),
    model(
        "fal-ai/stable-cascade",
        "Stable Cascade",
        "Efficient latent space generation",
    ),
    model(
        "fal-ai/playground-v25",
        "Playground v2.5",
        "High-quality aesthetic generation",
    ),
];

pub const IMAGE_SIZES: &[SizeDescriptor] = &[
    SizeDescriptor {
        id: "square_hd",
        name: "Square HD",
        width: 1024,
        height: 1024,
    },
    SizeDescriptor {
        id: "square",
        name: "Square",
        width: 512,
        height: 512,
    },
    SizeDescriptor {
        id: "portrait_4_3",
        name: "Portrait 4:3",
        width: 768,
        height: 1024,
    },
    SizeDescriptor {
        id: "portrait_16_9",
        name: "Portrait 16:9",
        width: 1080,
        height: 1920,
    },
    SizeDescriptor {
        id: "landscape_4_3",
        name: "Landscape 4:3",
        width: 1024,
        height: 768,
    },
    SizeDescriptor {
        id: "landscape_16_9",
        name: "Landscape 16:9",
        width: 1920,
        height: 1080,
    },
];

pub fn find_model(id: &str) -> Option<&'static ModelDescriptor> {
    MODELS.iter().find(|m| m.id == id)
}

pub fn find_size(id: &str) -> Option<&'static SizeDescriptor> {
    IMAGE_SIZES.iter().find(|s| s.id == id)
}

/// Look up a model, failing with [`CatalogError::UnknownModel`].
pub fn model_by_id(id: &str) -> Result<&'static ModelDescriptor, CatalogError> {
    find_model(id).ok_or_else(|| CatalogError::UnknownModel(id.to_string()))
}

/// Look up a size preset, failing with [`CatalogError::UnknownSize`].
pub fn size_by_id(id: &str) -> Result<&'static SizeDescriptor, CatalogError> {
    find_size(id).ok_or_else(|| CatalogError::UnknownSize(id.to_string()))
}

/// Display name for a model id, falling back to the id itself.
pub fn model_name(id: &str) -> &str {
    find_model(id).map(|m| m.name).unwrap_or(id)
}
