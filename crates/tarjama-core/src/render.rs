//! Result rendering: the HTML page and a plain-text listing.
//!
//! The page pairs each original screenshot with its translation; the
//! translation block is right-to-left. Every user-derived string goes
//! through Tera's autoescaping. Credentials are never rendered.

use crate::batch::TranslationResult;
use crate::provider::Provider;
use crate::session::{Banner, Session};
use serde::Serialize;
use tera::{Context, Tera};

const PAGE_TEMPLATE: &str = include_str!("../templates/page.html.tera");

#[derive(Clone, Serialize)]
struct ProviderView {
    id: &'static str,
    label: &'static str,
    selected: bool,
    key_set: bool,
    key_url: &'static str,
}

#[derive(Serialize)]
struct BannerView<'a> {
    kind: &'static str,
    message: &'a str,
}

#[derive(Serialize)]
struct UploadView {
    caption: String,
    src: String,
}

#[derive(Serialize)]
struct ResultView {
    heading: String,
    caption: String,
    src: String,
    text: String,
    ok: bool,
}

fn result_views(results: &[TranslationResult]) -> Vec<ResultView> {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| ResultView {
            heading: format!("Image {} Translation", i + 1),
            caption: format!("Original Image {}", i + 1),
            src: r.image.display_uri(),
            text: r.text(),
            ok: r.is_ok(),
        })
        .collect()
}

fn banner_view(banner: &Banner) -> BannerView<'_> {
    match banner {
        Banner::Success(message) => BannerView {
            kind: "success",
            message,
        },
        Banner::Error(message) => BannerView {
            kind: "error",
            message,
        },
    }
}

/// Render the interactive page for a session.
pub fn render_page(session: &Session) -> Result<String, tera::Error> {
    let providers: Vec<ProviderView> = Provider::ALL
        .iter()
        .map(|p| ProviderView {
            id: p.id(),
            label: p.label(),
            selected: *p == session.provider(),
            key_set: !session.credential(*p).is_empty(),
            key_url: p.key_url(),
        })
        .collect();
    let active = providers
        .iter()
        .find(|p| p.selected)
        .cloned();

    let uploads: Vec<UploadView> = session
        .images()
        .iter()
        .enumerate()
        .map(|(i, image)| UploadView {
            caption: format!("Image {}", i + 1),
            src: image.display_uri(),
        })
        .collect();

    let mut context = Context::new();
    context.insert("interactive", &true);
    context.insert("providers", &providers);
    context.insert("active", &active);
    context.insert("uploads", &uploads);
    context.insert("banner", &session.banner().map(banner_view));
    context.insert("results", &result_views(session.results()));
    Tera::one_off(PAGE_TEMPLATE, &context, true)
}

/// Render a standalone results page, without the form.
pub fn render_results_html(results: &[TranslationResult]) -> Result<String, tera::Error> {
    let mut context = Context::new();
    context.insert("interactive", &false);
    context.insert("banner", &Option::<BannerView>::None);
    context.insert("results", &result_views(results));
    Tera::one_off(PAGE_TEMPLATE, &context, true)
}

/// Plain-text listing for terminals.
pub fn render_results_text(results: &[TranslationResult]) -> String {
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        out.push_str(&format!("=== Image {} Translation ({}) ===\n", i + 1, r.image.name));
        out.push_str(&r.text());
        if !out.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out
}
