//! Route table, printed at startup

pub const ROUTES: &[(&str, &str, &str)] = &[
    // Video workflow
    ("GET", "/api/gemini/generate-and-save", "Showcase video status"),
    ("POST", "/api/gemini/generate-and-save", "Generate showcase video"),
    ("GET", "/api/gemini/poll-video", "Poll showcase operation (?operationId=)"),
    ("GET", "/api/gemini/generate-hero-video", "Hero video status"),
    ("POST", "/api/gemini/generate-hero-video", "Generate hero video"),
    ("GET", "/api/gemini/poll-hero-video", "Poll hero operation (?operationId=)"),
    ("POST", "/api/gemini/video", "Direct Veo request, nothing stored"),
    ("GET", "/api/gemini/video", "Poll direct operation (?operationId=)"),

    // Text
    ("POST", "/api/gemini", "Text generation proxy"),
    ("GET", "/api/gemini/test-api", "Upstream connectivity probe"),

    // Catalog
    ("GET", "/api/models", "Catalog view (?filter=&sort=)"),
    ("GET", "/api/models/:id", "Single catalog entry"),

    // Visitor state
    ("GET", "/api/showroom", "Visitor showroom state"),
    ("POST", "/api/showroom/compare/:id", "Add to compare list"),
    ("DELETE", "/api/showroom/compare/:id", "Remove from compare list"),
    ("DELETE", "/api/showroom/compare", "Clear compare list"),
    ("POST", "/api/showroom/saved/:id", "Toggle saved model"),
    ("POST", "/api/showroom/selection", "Filter, sort, expanded card"),

    // Contact form
    ("POST", "/api/contact/draft", "Update contact draft"),
    ("DELETE", "/api/contact/draft", "Reset contact draft"),
    ("POST", "/api/contact", "Submit enquiry"),

    // Misc
    ("GET", "/api/health", "Health check"),
    ("GET", "/videos/*", "Generated video files"),
];

pub fn print_routes() {
    println!("Routes:");
    for (method, path, description) in ROUTES {
        println!("  {:<7} {:<38} {}", method, path, description);
    }
    println!();
}
