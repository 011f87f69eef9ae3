//! Plantillas de prompt y construcción de `ModelRequest` para cada etapa.
use caption_core::constants::TRENDING_TOOL_NAME;
use caption_core::{AugmentationRequest, CaptionRequest};
use caption_domain::schema::{AUGMENT_OUTPUT, CAPTION_OUTPUT, TRENDING_TOOL_INPUT};
use caption_domain::HASHTAG_CAP;
use serde_json::json;

use crate::model::{Message, ModelRequest, ToolSpec};

pub const CAPTION_PROMPT_NAME: &str = "generateSocialMediaCaption";
pub const AUGMENT_PROMPT_NAME: &str = "incorporateTrendingTopics";

const CAPTION_TEMPLATE: &str = "You write engaging social media captions and pick relevant hashtags for images.\n\
\n\
Write one caption and a list of hashtags tuned for {{platform}} for the attached image.\n\
\n\
Image: {{media}}";

const AUGMENT_TEMPLATE: &str = "You are an expert in social media trends and hashtag optimization.\n\
\n\
Starting hashtags: {{hashtags}}\n\
Platform: {{platform}}\n\
\n\
Blend relevant trending topics for the platform into the list, keeping at most {{cap}} hashtags. \
The {{tool}} tool returns the current trending topics for a platform.\n\
\n\
Answer with the final list of hashtags.";

/// Sustituye `{{clave}}` por su valor. Claves sin valor quedan tal cual.
pub fn render(template: &str, vars: &[(&str, String)]) -> String {
    vars.iter()
        .fold(template.to_string(), |acc, (k, v)| acc.replace(&format!("{{{{{k}}}}}"), v))
}

pub fn trending_tool_spec() -> ToolSpec {
    ToolSpec { name: TRENDING_TOOL_NAME.to_string(),
               description: "Retrieves the current trending topics for a given social media platform.".to_string(),
               parameters: TRENDING_TOOL_INPUT.to_json_schema() }
}

pub fn caption_request(request: &CaptionRequest) -> ModelRequest {
    let prompt = render(CAPTION_TEMPLATE,
                        &[("platform", request.platform.to_string()),
                          ("media", format!("<{} image, {} bytes>", request.image.mime_type(), request.image.len()))]);
    ModelRequest { prompt_name: CAPTION_PROMPT_NAME,
                   input: json!({"platform": request.platform, "mimeType": request.image.mime_type()}),
                   media: Some(request.image.to_data_uri()),
                   tools: Vec::new(),
                   output_schema: CAPTION_OUTPUT.to_json_schema(),
                   transcript: vec![Message::User { text: prompt.clone() }],
                   prompt }
}

pub fn augmentation_request(request: &AugmentationRequest) -> ModelRequest {
    let prompt = render(AUGMENT_TEMPLATE,
                        &[("hashtags", request.hashtags.join(", ")),
                          ("platform", request.platform.to_string()),
                          ("cap", HASHTAG_CAP.to_string()),
                          ("tool", TRENDING_TOOL_NAME.to_string())]);
    ModelRequest { prompt_name: AUGMENT_PROMPT_NAME,
                   input: json!({"platform": request.platform, "hashtags": request.hashtags}),
                   media: None,
                   tools: vec![trending_tool_spec()],
                   output_schema: AUGMENT_OUTPUT.to_json_schema(),
                   transcript: vec![Message::User { text: prompt.clone() }],
                   prompt }
}
