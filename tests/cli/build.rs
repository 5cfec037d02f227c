use anyhow::Result;
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

#[test]
fn test_build_writes_per_locale_html() -> Result<()> {
    let test = CliTest::with_sim("friction")?;

    let output = test
        .build_command("friction")
        .args(["--locales", "en,es"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("Built friction (phet): 9 artifacts, 2 locales, 2 strings"));

    let build_dir = test.root().join("friction/build/phet");
    for name in [
        "friction_en_phet.html",
        "friction_es_phet.html",
        "friction_all_phet_debug.html",
        "xhtml/friction_all.xhtml",
        "xhtml/friction_all.js",
        "dependencies.json",
        "string-map.json",
        "english-string-map.json",
        "friction_en_iframe_phet.html",
    ] {
        assert!(build_dir.join(name).is_file(), "missing {}", name);
    }
    assert!(!build_dir.join("friction_all_phet.html").exists());

    let es = test.read_file("friction/build/phet/friction_es_phet.html")?;
    assert!(es.contains("<title>Friction</title>"));
    assert!(es.contains("Hola"));
    assert!(es.contains("window.started = true;"));

    let english: Value = serde_json::from_str(&test.read_file("friction/build/phet/english-string-map.json")?)?;
    assert_eq!(english["FRICTION/hello"], "\u{202a}Hello\u{202c}");

    Ok(())
}

#[test]
fn test_build_all_html_and_every_locale() -> Result<()> {
    let test = CliTest::with_sim("friction")?;

    let output = test
        .build_command("friction")
        .args(["--locales", "*", "--all-html"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let build_dir = test.root().join("friction/build/phet");
    assert!(build_dir.join("friction_all_phet.html").is_file());
    assert!(build_dir.join("friction_all_phet.html.gz").is_file());
    assert!(build_dir.join("friction_all_iframe_phet.html").is_file());
    assert!(build_dir.join("friction_es_phet.html").is_file());
    assert!(!build_dir.join("friction_ar_phet.html").exists());

    let all = test.read_file("friction/build/phet/friction_all_phet.html")?;
    assert!(all.contains("window.phet.chipper.availableLocales = [\"en\",\"es\"];"));

    Ok(())
}

#[test]
fn test_build_restricted_brand_without_repository() -> Result<()> {
    let test = CliTest::with_sim("friction")?;

    let output = test
        .build_command("friction")
        .args(["--brands", "phet-io"])
        .output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Error: Brand 'phet-io' requires the 'phet-io' repository"));
    assert!(!test.root().join("friction/build").exists());

    Ok(())
}

#[test]
fn test_build_phet_io_ships_combined_html_only() -> Result<()> {
    let test = CliTest::with_sim("friction")?;
    std::fs::create_dir_all(test.root().join("phet-io"))?;

    let output = test
        .build_command("friction")
        .args(["--brands", "phet-io", "--locales", "en,es"])
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let build_dir = test.root().join("friction/build/phet-io");
    assert!(build_dir.join("friction_all_phet-io.html").is_file());
    assert!(!build_dir.join("friction_en_phet-io.html").exists());
    assert!(!build_dir.join("friction_en_iframe_phet-io.html").exists());

    Ok(())
}

#[test]
fn test_build_missing_string_fails() -> Result<()> {
    let test = CliTest::with_sim("friction")?;
    test.write_file(
        "friction/js/friction-main.js",
        "import FrictionStrings from './FrictionStrings.js';\nsay( FrictionStrings.absent );\n",
    )?;

    let output = test.build_command("friction").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Unable to find the string \"absent\" in friction"));

    Ok(())
}

#[test]
fn test_build_unknown_repository() -> Result<()> {
    let test = CliTest::with_sim("friction")?;

    let output = test.build_command("nonexistent").output()?;
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to read package manifest"));

    Ok(())
}

#[test]
fn test_build_passes_profile_flag_to_bundler() -> Result<()> {
    let test = CliTest::with_sim("friction")?;
    test.write_file(
        "bundle.sh",
        "printf '%s' \"$3\" > bundler-flags.txt\ncat \"$1/bundle.json\"\n",
    )?;

    let output = test
        .build_command("friction")
        .arg("--profile-file-size")
        .output()?;
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(test.read_file("bundler-flags.txt")?, "--profile-file-size");

    Ok(())
}
