//! Home page and sitemaps.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
};
use tracing::instrument;

use super::PageContext;
use crate::filters;
use crate::flash::MessageQuery;
use crate::middleware::OptionalIdentity;
use crate::state::AppState;

/// Public pages listed in both sitemaps.
pub const SITEMAP_PATHS: &[(&str, &str)] = &[
    ("/", "Home"),
    ("/books", "Books"),
    ("/customer/profile", "My profile"),
    ("/sitemap", "Sitemap"),
];

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
}

/// HTML sitemap template.
#[derive(Template, WebTemplate)]
#[template(path = "sitemap.html")]
pub struct SitemapTemplate {
    pub page: PageContext,
    pub links: Vec<(&'static str, &'static str)>,
}

/// Display the home page.
#[instrument(skip_all)]
pub async fn home(
    OptionalIdentity(identity): OptionalIdentity,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    HomeTemplate {
        page: PageContext::new(identity.as_ref(), query),
    }
}

/// Display the HTML sitemap.
pub async fn sitemap_html(OptionalIdentity(identity): OptionalIdentity) -> impl IntoResponse {
    SitemapTemplate {
        page: PageContext::new(identity.as_ref(), MessageQuery::default()),
        links: SITEMAP_PATHS.to_vec(),
    }
}

/// Serve the XML sitemap with absolute URLs under the configured base URL.
pub async fn sitemap_xml(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/xml")],
        render_sitemap_xml(|path| state.config().absolute_url(path)),
    )
}

fn render_sitemap_xml(absolute: impl Fn(&str) -> String) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for (path, _) in SITEMAP_PATHS {
        xml.push_str("  <url><loc>");
        xml.push_str(&absolute(path));
        xml.push_str("</loc></url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_xml_lists_public_pages() {
        let xml = render_sitemap_xml(|path| format!("https://books.example.com{path}"));

        assert!(xml.starts_with("<?xml"));
        assert!(xml.contains("<loc>https://books.example.com/books</loc>"));
        assert!(xml.contains("<loc>https://books.example.com/sitemap</loc>"));
        assert_eq!(xml.matches("<url>").count(), SITEMAP_PATHS.len());
    }
}
