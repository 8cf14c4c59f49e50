//! Static production-script templates
//!
//! Used when the text model cannot draft a script. `{prompt}` is replaced
//! with the generation prompt.

pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// Brief sent to the text model when asking for a script.
pub fn script_request(prompt: &str) -> String {
    format!(
        "Generate a detailed video production script for the following concept:\n\n\
         {prompt}\n\n\
         Provide:\n\
         1. A detailed shot-by-shot description\n\
         2. Camera movements and angles\n\
         3. Visual elements and composition\n\
         4. Duration and pacing\n\
         5. Technical specifications (resolution, aspect ratio, etc.)\n\n\
         Format as a professional video production brief."
    )
}

pub fn render(template: &str, prompt: &str) -> String {
    template.replace(PROMPT_PLACEHOLDER, prompt)
}

pub const SHOWCASE_TEMPLATE: &str = "\
VIDEO PRODUCTION SCRIPT
Generated for: {prompt}

PROJECT OVERVIEW:
- Duration: 8 seconds
- Aspect Ratio: 16:9
- Resolution: 1080p (1920x1080)
- Frame Rate: 30fps
- Style: Cinematic, premium, luxury

SHOT BREAKDOWN:

SHOT 1 (0-2 seconds):
- Wide opening on a scenic highway at golden hour
- Camera: slow dolly forward from a slightly raised position
- Lighting: warm low sun, soft shadows

SHOT 2 (2-5 seconds):
- The Innoson G80 enters from frame right
- Camera: smooth tracking alongside the vehicle
- Lighting: golden highlights across the bodywork

SHOT 3 (5-7 seconds):
- Detail close-ups: badge, headlights, wheel arches
- Camera: slow push-in on each element

SHOT 4 (7-8 seconds):
- Pull back to a wide shot of the G80 on the open African road
- Closing line: Pride of African Roads

CAMERA MOVEMENTS:
- Continuous dolly and tracking moves, no hard cuts
- Deliberate pacing that lets the design read

TECHNICAL SPECIFICATIONS:
- Resolution: 1080p (1920x1080), 16:9, 30fps
- Color Space: Rec. 709
- Audio: engine note over soft ambient highway sound
- Post-Production: warm golden-hour grade, smooth transitions

NOTES:
The piece presents the G80 as a premium vehicle at home on African roads.
";

pub const HERO_TEMPLATE: &str = "\
HERO VIDEO PRODUCTION SCRIPT
Generated for: {prompt}

PROJECT OVERVIEW:
- Duration: 10 seconds
- Aspect Ratio: 16:9
- Resolution: 1080p (1920x1080)
- Frame Rate: 30fps
- Style: Cinematic, premium, fleet showcase

SHOT BREAKDOWN:

SHOT 1 (0-3 seconds):
- Aerial establishing shot of an African highway at golden hour
- Camera: slow aerial dolly forward, road running to the horizon
- Lighting: warm low sun over the landscape

SHOT 2 (3-7 seconds):
- The fleet (G80, G40, G5T) driving in formation
- Camera: smooth tracking shot holding all three vehicles in frame
- Lighting: golden highlights on each finish

SHOT 3 (7-10 seconds):
- Push in on design details, then pull back to the full fleet
- Closing line: Pride of African Roads

CAMERA MOVEMENTS:
- Mix of aerial and ground-level perspectives
- Continuous moves that emphasise the fleet moving as one

TECHNICAL SPECIFICATIONS:
- Resolution: 1080p (1920x1080), 16:9, 30fps
- Color Space: Rec. 709
- Audio: layered engine sounds over ambient highway sound
- Post-Production: warm golden-hour grade, smooth transitions

NOTES:
The piece presents the full Innoson SUV range together on African roads.
";
