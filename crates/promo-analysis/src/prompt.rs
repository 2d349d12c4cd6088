//! Prompt assembly for page analysis and video generation.

use promo_models::{AspectRatio, ProductInfo, VideoDuration};

/// Page text beyond this many characters is not sent to the model.
pub const MAX_PAGE_CHARS: usize = 30_000;

/// Collapse whitespace runs and cap the length at [`MAX_PAGE_CHARS`].
pub fn normalize_page_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, MAX_PAGE_CHARS).to_string()
}

/// Longest prefix of `s` with at most `max_chars` characters.
pub fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Prompt asking the model for the seven copy elements as `label: value` lines.
pub fn build_analysis_prompt(page_text: &str) -> String {
    format!(
        "You analyze landing pages and extract what a short performance-ad video needs.\n\
         \n\
         Extract or infer these seven elements:\n\
         1. Product name: the product or brand name, from the headline, title or logo text\n\
         2. Target audience: who the page speaks to\n\
         3. Catchphrase: the most striking short phrase in the first view\n\
         4. Benefit 1: the most important benefit or feature\n\
         5. Benefit 2: the second most important benefit or feature\n\
         6. Offer: free trial, discount or campaign wording; \"None\" if there is none\n\
         7. CTA text: the wording of the main call-to-action button\n\
         \n\
         Answer in the page's language, exactly in this format:\n\
         Product name: ...\n\
         Target audience: ...\n\
         Catchphrase: ...\n\
         Benefit 1: ...\n\
         Benefit 2: ...\n\
         Offer: ...\n\
         CTA text: ...\n\
         \n\
         [Page content]\n\
         {}",
        normalize_page_text(page_text)
    )
}

fn or_placeholder<'a>(value: &'a Option<String>, placeholder: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(placeholder)
}

/// Prompt for the image-to-video model.
///
/// The timeline is split into four equal beats over `duration`. Square
/// requests ask for the action to stay in the vertical middle band, since the
/// clip is generated in portrait and cropped afterwards.
pub fn build_video_prompt(
    info: &ProductInfo,
    aspect_ratio: AspectRatio,
    duration: VideoDuration,
) -> String {
    let product_name = or_placeholder(&info.product_name, "[Product name]");
    let catchphrase = or_placeholder(&info.catchphrase, "[Catchphrase]");
    let benefit1 = or_placeholder(&info.benefit1, "[Benefit 1]");
    let benefit2 = or_placeholder(&info.benefit2, "[Benefit 2]");
    let offer = or_placeholder(&info.offer, "[Offer]");
    let cta_text = or_placeholder(&info.cta_text, "[CTA text]");

    let secs = duration.as_secs();
    let beat = secs / 4;

    let mut prompt = format!(
        "Create a {secs}-second short video ad for social media. \
         Tone: modern, fast-paced and trustworthy. \
         Music: upbeat instrumental only, no voice or narration.\n\n"
    );

    if aspect_ratio.is_square() {
        prompt.push_str(
            "Framing: the video will be shown as a 1:1 square. Keep all important text \
             and character action in the vertical middle of the frame and leave the top \
             and bottom free of key elements.\n\n",
        );
    }

    prompt.push_str(&format!(
        "Input image: the brand's mascot character (illustration). Animate this mascot.\n\n\
         0-{b1}s opening: bright, dynamic abstract background in the brand colors. The mascot \
         jumps in or waves to catch attention. Large bold text in the center: \"{catchphrase}\".\n\n\
         {b1}-{b2}s benefit: the mascot moves to a corner and points or nods as a guide. A simple \
         icon for \"{benefit1}\" pops up in the center with the text \"{benefit1}\".\n\n\
         {b2}-{b3}s second benefit: the icon switches quickly to one evoking \"{benefit2}\" or \
         \"{offer}\". The mascot looks surprised and delighted. Text: \"{benefit2}\" or \"{offer}\".\n\n\
         {b3}-{secs}s ending: the background turns clean white or a solid color. \"{product_name}\" \
         appears large like a logo, above a button reading \"{cta_text}\". Bottom text: \
         \"Search {product_name}\".\n\n\
         Text rules: bold sans-serif everywhere, strong contrast with the background, \
         legibility first, no garbled characters.",
        b1 = beat,
        b2 = beat * 2,
        b3 = beat * 3,
    ));

    prompt
}
