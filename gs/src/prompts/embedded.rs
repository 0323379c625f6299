//! Embedded prompts
//!
//! Templates are compiled into the binary and used when no override file is
//! found. The rubric constants at the bottom are never overridable.

/// Feature detection for an uploaded yard photo
pub const DETECT: &str = "Identify only the unique, specific vegetation or functional features in this yard photo that a homeowner might want to explicitly choose to keep, hide, or replace (e.g., 'Japanese Maple Tree', 'Stone Statue', 'Ornamental Fountain', 'Utility Box', 'AC Unit', 'Electrical Box', 'Specific Large Rose Bush', 'Old Oak Tree'). IGNORE permanent architectural elements like 'House', 'Main Building', 'Driveway', 'Sidewalk', 'Garage', and 'Fence' as these are considered permanent. Return a JSON array of short, descriptive strings.";

/// Brief for the first design of a project
pub const DESIGN_INSTRUCTION: &str = "Generate a professional landscape design {{#if style}}in the {{style}} style{{else}}matching the aesthetic and layout of the provided reference design{{/if}}{{#if requirements}}. Additionally, satisfy these specific requirements: {{requirements}}{{/if}}. Include beautiful vegetation and high-end materials.";

/// Brief for a chat-driven redesign
pub const REFINE_INSTRUCTION: &str = "Modify the previous design by following these specific instructions: {{message}}. Build upon the existing concept while maintaining strict architectural boundaries.";

/// Opening of every generation prompt
pub const DESIGN: &str = "You are a world-class senior landscape architect with decades of experience. Redesign the yard in the provided base image based on these instructions: {{instruction}}.{{#if style}} The style must be {{style}}.{{/if}}";

/// Advisory chat about the current render
pub const CONSULT: &str = r#"System: You are a Senior Landscape Architecture Consultant. You analyze designs based on horticultural standards, spatial flow, and curb appeal.
When the user asks for changes, provide expert insights (e.g., 'By adding these evergreens here, we create year-round structure').
Current Design context: {{context}}
User Input: {{message}}

Provide a professional, knowledgeable, and encouraging response. If the user asks for something that violates architectural safety or standard design logic, gently advise them on a better alternative."#;

/// First assistant message of a new project
pub const WELCOME: &str = r#"Welcome to your new garden design! I've created a {{tier}} concept based on your photo {{#if style}}using the {{style}} style{{else}}and the reference design you provided{{/if}}. I've applied senior-level landscaping principles: ensuring structural layering, proper scale relative to your house, and strict clear-zone rules for your driveway and walkways.{{#if requirements}} I've also incorporated your special requests: "{{requirements}}".{{/if}}"#;

/// Assistant message accompanying a chat-driven redesign
pub const REFINED: &str = "I've updated the design reflecting your request. I made sure to maintain professional planting depths and kept all architectural hardscapes clear as per professional standards.";

/// Reply used when the consultant answers with nothing
pub const FALLBACK_REPLY: &str =
    "I'm here to refine your vision with professional architectural standards. How can we improve this space?";

// Fixed rubric appended to every generation request

pub const TRANSFORMATION_SIMPLE: &str = "TRANSFORMATION LEVEL: MINIMAL (LEAST DESTRUCTIVE). Keep existing layout and beds. Only refresh plants and clean edges. Do not remove major existing trees or non-architectural structures unless strictly necessary.";

pub const TRANSFORMATION_BALANCED: &str = "TRANSFORMATION LEVEL: MODERATE (BALANCED). Upgrade plant palette, refine bed shapes, and introduce high-quality materials while respecting the general flow of the existing space.";

pub const TRANSFORMATION_PREMIUM: &str = "TRANSFORMATION LEVEL: MAXIMUM (TRANSFORMATIVE). Full creative freedom to overhaul layout, add hardscapes (stone patios, fire pits, water features), and create multi-layered high-end planting zones.";

pub const ARCHITECTURAL_BOUNDARIES: &str = r#"STRICT ARCHITECTURAL BOUNDARIES:
- MANDATORY: The House, Main Building, Garage, Driveway, Sidewalks, and Fencing MUST be preserved exactly as they are. DO NOT MODIFY, REPLACE, OR OVERLAP THEM.
- NO ENCROACHMENT: Under no circumstances should plants, mulch, grass, or soil appear on top of the driveway, garage floor, or sidewalks. These functional surfaces must remain 100% clear.
- CLEAN EDGING: All planting beds must have sharp, professional edging separating them from lawn or hardscape."#;

pub const LANDSCAPING_PRINCIPLES: &str = r#"EXPERT LANDSCAPING PRINCIPLES:
1. LAYERED PLANTING: Use the 'Short-Medium-Tall' principle. Place low groundcovers at the front, medium perennials/shrubs in the middle, and taller specimens/privacy screens at the back or against the house.
2. SCREENING: If utility boxes, AC units, or trash areas are visible and NOT in the 'keep' list, screen them elegantly with evergreen shrubs or ornamental grasses.
3. SCALE & PROPORTION: Select plants that complement the house's height. Do not block windows with trees unless they are specifically 'airy' species.
4. MATERIAL REALISM: Use realistic textures for mulch (bark/dark), stone (river rock/slate), and paving. Ensure lighting and shadows on new elements match the time of day in the original photo.
5. FOUNDATION PLANTING: Ensure plants near the house foundation look anchored and natural, not floating."#;

pub const KEEP_PREFIX: &str =
    "Additionally, you MUST preserve the following specific unique features exactly as they appear:";

pub const TECHNICAL_INSTRUCTIONS: &str = r#"TECHNICAL INSTRUCTIONS:
- PRESERVE PERSPECTIVE: Maintain the exact camera angle, zoom, and framing.
- NO CROPPING: Do not change the image aspect ratio or dimensions.

Return ONLY the modified image that matches the input's framing perfectly."#;

/// Look up an overridable template by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "detect" => Some(DETECT),
        "design-instruction" => Some(DESIGN_INSTRUCTION),
        "refine-instruction" => Some(REFINE_INSTRUCTION),
        "design" => Some(DESIGN),
        "consult" => Some(CONSULT),
        "welcome" => Some(WELCOME),
        "refined" => Some(REFINED),
        _ => None,
    }
}
