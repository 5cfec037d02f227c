//! Optional pages and copies written after the main artifacts.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use super::document::escape_markup;

const IFRAME_WIDTH: u32 = 768;
const IFRAME_HEIGHT: u32 = 464;

/// `variant` is a locale or `all`.
pub fn iframe_file_name(repo: &str, variant: &str, brand: &str) -> String {
    format!("{}_{}_iframe_{}.html", repo, variant, brand)
}

/// Test page embedding `{repo}_{variant}_{brand}.html` at a fixed size.
pub fn iframe_html(repo: &str, variant: &str, brand: &str, title: &str) -> String {
    format!(
        "<!DOCTYPE HTML>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\"/>\n\
         <title>{title}</title>\n\
         </head>\n\
         <body>\n\
         <iframe src=\"{repo}_{variant}_{brand}.html\" width=\"{width}\" height=\"{height}\" \
         scrolling=\"no\" allowfullscreen title=\"{title}\"></iframe>\n\
         </body>\n\
         </html>\n",
        title = escape_markup(title),
        repo = repo,
        variant = variant,
        brand = brand,
        width = IFRAME_WIDTH,
        height = IFRAME_HEIGHT,
    )
}

pub fn write_iframe(build_dir: &Path, repo: &str, variant: &str, brand: &str, title: &str) -> Result<PathBuf> {
    let path = build_dir.join(iframe_file_name(repo, variant, brand));
    fs::write(&path, iframe_html(repo, variant, brand, title))
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

/// Page showing the simulation next to a live copy of its description tree.
pub fn a11y_view_html(repo: &str, locale: &str, brand: &str, title: &str) -> String {
    format!(
        "<!DOCTYPE HTML>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\"/>\n\
         <title>{title} - A11y View</title>\n\
         <style>\n\
         body {{ display: flex; margin: 0; }}\n\
         #sim {{ flex: 0 0 auto; border: 0; }}\n\
         #a11y-view {{ flex: 1 1 auto; padding: 1em; overflow: auto; font-family: sans-serif; }}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         <iframe id=\"sim\" src=\"{repo}_{locale}_{brand}.html?supportsInteractiveDescription=true&amp;postMessageOnLoad\" \
         width=\"{width}\" height=\"{height}\" title=\"{title}\"></iframe>\n\
         <div id=\"a11y-view\" aria-live=\"polite\"></div>\n\
         <script type=\"text/javascript\">\n\
         (function() {{\n\
         \x20 var sim = document.getElementById( 'sim' );\n\
         \x20 var view = document.getElementById( 'a11y-view' );\n\
         \x20 function copy() {{\n\
         \x20   var root = sim.contentDocument && sim.contentDocument.querySelector( '.a11y-pdom-root' );\n\
         \x20   if ( root ) {{ view.innerHTML = root.innerHTML; }}\n\
         \x20 }}\n\
         \x20 sim.addEventListener( 'load', function() {{ setInterval( copy, 500 ); }} );\n\
         }})();\n\
         </script>\n\
         </body>\n\
         </html>\n",
        title = escape_markup(title),
        repo = repo,
        locale = locale,
        brand = brand,
        width = IFRAME_WIDTH,
        height = IFRAME_HEIGHT,
    )
}

pub fn write_a11y_view(build_dir: &Path, repo: &str, locale: &str, brand: &str, title: &str) -> Result<PathBuf> {
    let path = build_dir.join(format!("{}_a11y_view.html", repo));
    fs::write(&path, a11y_view_html(repo, locale, brand, title))
        .with_context(|| format!("Failed to write {:?}", path))?;
    Ok(path)
}

/// Copy a file or directory tree to `dest_dir/<file name of src>`.
pub fn copy_into(src: &Path, dest_dir: &Path) -> Result<PathBuf> {
    let name = src
        .file_name()
        .with_context(|| format!("Cannot copy {:?}: no file name", src))?;
    let dest = dest_dir.join(name);

    if src.is_file() {
        fs::copy(src, &dest).with_context(|| format!("Failed to copy {:?}", src))?;
        return Ok(dest);
    }

    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", src))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).with_context(|| format!("Failed to create {:?}", target))?;
        } else {
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {:?}", entry.path()))?;
        }
    }
    Ok(dest)
}
