//! Script fragments shared by every generated document.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;
use serde_json::{Map, Value};

use super::document::{DocumentConfig, DocumentInputs};
use crate::core::licenses::ThirdPartyEntries;

/// Runs the simulation once every preceding script has been evaluated.
const STARTUP_TEMPLATE: &str = r#"(function() {
  'use strict';
  var chipper = window.phet.chipper;
  chipper.startupTime = Date.now();
  if ( typeof chipper.runSimulation === 'function' ) {
    chipper.runSimulation();
  }
})();"#;

/// Serialize a value for inlining inside a `<script>` element.
pub fn script_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).context("Failed to serialize script data")?;
    Ok(json.replace("</", "<\\/"))
}

/// Copyright and licensing notice placed at the top of every document.
pub fn html_header(title: &str, version: &str, brand: &str, year: i32) -> String {
    let mut header = format!(
        "{} {}\n\
         Copyright 2002-{}, Regents of the University of Colorado\n\
         PhET Interactive Simulations, University of Colorado Boulder\n\n",
        title, version, year
    );

    if brand == "phet-io" {
        header.push_str(
            "This Interactive Simulation is licensed under the PhET-iO license agreement.\n\
             Redistribution requires permission from the University of Colorado.\n\
             Contact phethelp@colorado.edu regarding licensing.\n",
        );
    } else {
        header.push_str(
            "This Interactive Simulation is licensed under Creative Commons Attribution 4.0\n\
             For alternate source code licensing, see https://github.com/phetsims\n\
             For licenses for third-party software used by this simulation, see below\n\
             For more information, see https://phet.colorado.edu/en/licensing/html\n\n\
             The PhET name and PhET logo are registered trademarks of The Regents of the\n\
             University of Colorado. Permission is granted to use the PhET name and PhET logo\n\
             only for attribution purposes. Use of the PhET name and/or PhET logo for promotional,\n\
             marketing, or advertising purposes requires a separate license agreement from the\n\
             University of Colorado. Contact phethelp@colorado.edu regarding licensing.\n",
        );
    }

    header
}

/// Third-party license data, kept outside the minified bundle so the notices survive.
pub fn license_script(third_party: &ThirdPartyEntries) -> Result<String> {
    let mut names: Vec<String> = third_party.lib.keys().cloned().collect();
    for resources in third_party.media.values() {
        names.extend(resources.keys().cloned());
    }

    let mut script = String::from("/*\n * Third-party resources used by this simulation:\n");
    for name in &names {
        script.push_str(&format!(" * - {}\n", name.replace("*/", "* /")));
    }
    script.push_str(" */\n");
    script.push_str("window.phet = window.phet || {};\n");
    script.push_str("window.phet.chipper = window.phet.chipper || {};\n");
    script.push_str(&format!(
        "window.phet.chipper.thirdPartyEntries = {};\n",
        script_json(third_party)?
    ));
    Ok(script)
}

/// Per-document `window.phet.chipper` globals: strings, locales and build flags.
pub fn initialization_script(inputs: &DocumentInputs<'_>, config: &DocumentConfig<'_>) -> Result<String> {
    let selected: Vec<&String> = if config.include_all_locales {
        inputs.locales.iter().collect()
    } else {
        inputs
            .locales
            .iter()
            .filter(|locale| *locale == config.locale)
            .collect()
    };

    let mut strings = Map::new();
    let mut locale_data = Map::new();
    for locale in &selected {
        if let Some(map) = inputs.strings.string_map.get(*locale) {
            strings.insert(locale.to_string(), serde_json::to_value(map)?);
        }
        if let Ok(info) = inputs.catalog.get(locale) {
            locale_data.insert(locale.to_string(), serde_json::to_value(info)?);
        }
    }

    let globals: Vec<(&str, Value)> = vec![
        ("packageObject", inputs.package_object.clone()),
        ("project", Value::from(inputs.repo)),
        ("version", Value::from(inputs.version)),
        ("brand", Value::from(inputs.brand)),
        ("buildTimestamp", Value::from(inputs.timestamp)),
        ("locale", Value::from(config.locale)),
        ("availableLocales", serde_json::to_value(&selected)?),
        ("strings", Value::Object(strings)),
        (
            "stringMetadata",
            serde_json::to_value(&inputs.strings.string_metadata)?,
        ),
        ("localeData", Value::Object(locale_data)),
        ("dependencies", serde_json::to_value(inputs.dependencies)?),
        ("isDebugBuild", Value::from(config.is_debug_build)),
        ("allowLocaleSwitching", Value::from(config.allow_locale_switching)),
        ("isProduction", Value::from(!config.is_debug_build)),
    ];

    let mut script = String::from(
        "window.phet = window.phet || {};\nwindow.phet.chipper = window.phet.chipper || {};\n",
    );
    for (name, value) in globals {
        script.push_str(&format!(
            "window.phet.chipper.{} = {};\n",
            name,
            script_json(&value)?
        ));
    }
    Ok(script)
}

/// Scripts that follow the initialization script, in load order: splash image,
/// preloads, the bundle, the startup template.
pub fn startup_scripts(root: &Path, brand: &str, preloads: &[String], bundle_js: &str) -> Result<Vec<String>> {
    let mut scripts = Vec::with_capacity(preloads.len() + 3);

    let splash_path = root
        .join("brand")
        .join(brand)
        .join("images")
        .join("splash.svg");
    if splash_path.is_file() {
        let splash = fs::read(&splash_path)
            .with_context(|| format!("Failed to read splash image: {:?}", splash_path))?;
        scripts.push(format!(
            "window.phet.chipper.splashDataURI = 'data:image/svg+xml;base64,{}';",
            STANDARD.encode(splash)
        ));
    } else {
        tracing::debug!(brand = %brand, "no splash image for brand");
    }

    for preload in preloads {
        let path = root.join(preload);
        let script = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read preload script: {:?}", path))?;
        scripts.push(script);
    }

    scripts.push(bundle_js.to_string());
    scripts.push(STARTUP_TEMPLATE.to_string());
    Ok(scripts)
}
