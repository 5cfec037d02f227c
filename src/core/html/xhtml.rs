use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};

use super::document::{DocumentParts, escape_markup};

pub const XHTML_DIR: &str = "xhtml";

/// XHTML page that loads the program from a sibling script file.
pub fn xhtml_document(repo: &str, parts: &DocumentParts) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE html>\n\
         <html xmlns=\"http://www.w3.org/1999/xhtml\" lang=\"{lang}\">\n\
         <head>\n\
         <meta charset=\"utf-8\"/>\n\
         <title>{title}</title>\n\
         <script type=\"text/javascript\">\n//<![CDATA[\n{license}//]]>\n</script>\n\
         </head>\n\
         <body>\n\
         <script type=\"text/javascript\" src=\"{repo}_all.js\"></script>\n\
         </body>\n\
         </html>\n",
        lang = escape_markup(&parts.lang),
        title = escape_markup(&parts.title),
        license = parts.license_script.replace("]]>", "]]]]><![CDATA[>"),
        repo = repo,
    )
}

/// Write `xhtml/{repo}_all.xhtml` and `xhtml/{repo}_all.js` under `build_dir`.
pub fn write_xhtml(build_dir: &Path, repo: &str, parts: &DocumentParts) -> Result<Vec<PathBuf>> {
    let dir = build_dir.join(XHTML_DIR);
    fs::create_dir_all(&dir).with_context(|| format!("Failed to create {:?}", dir))?;

    let page = dir.join(format!("{}_all.xhtml", repo));
    fs::write(&page, xhtml_document(repo, parts))
        .with_context(|| format!("Failed to write {:?}", page))?;

    let script = dir.join(format!("{}_all.js", repo));
    fs::write(&script, &parts.code).with_context(|| format!("Failed to write {:?}", script))?;

    Ok(vec![page, script])
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::core::locale::Direction;

    fn parts() -> DocumentParts {
        DocumentParts {
            title: "Forces & Motion".to_string(),
            lang: "en".to_string(),
            direction: Direction::Ltr,
            license_script: "var licenses = {};\n".to_string(),
            code: "run();".to_string(),
        }
    }

    #[test]
    fn test_xhtml_document() {
        let page = xhtml_document("forces", &parts());
        assert!(page.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(page.contains("<title>Forces &amp; Motion</title>"));
        assert!(page.contains("//<![CDATA[\nvar licenses = {};\n//]]>"));
        assert!(page.contains("src=\"forces_all.js\""));
        assert!(!page.contains("run();"));
    }

    #[test]
    fn test_write_xhtml() {
        let dir = tempdir().unwrap();
        let written = write_xhtml(dir.path(), "forces", &parts()).unwrap();

        assert_eq!(
            written,
            vec![
                dir.path().join("xhtml/forces_all.xhtml"),
                dir.path().join("xhtml/forces_all.js"),
            ]
        );
        assert_eq!(fs::read_to_string(&written[1]).unwrap(), "run();");
    }
}
