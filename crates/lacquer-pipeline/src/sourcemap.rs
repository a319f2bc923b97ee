//! Source map siblings.
//!
//! Writes a minimal source map v3 file next to a compiled output and returns
//! the `sourceMappingURL` trailer to append to it. The maps carry the source
//! file names but no segment mappings; that is enough for devtools to point
//! at the original files.

use std::fs;
use std::io;
use std::path::Path;

/// Write `{out_path}.map` naming `sources` and return the map file name.
pub fn write_sibling(out_path: &Path, sources: &[&Path]) -> io::Result<String> {
    let file = out_path
        .file_name()
        .and_then(|f| f.to_str())
        .unwrap_or_default()
        .to_string();
    let map_name = format!("{file}.map");

    let map = serde_json::json!({
        "version": 3,
        "file": file,
        "sources": sources
            .iter()
            .map(|s| s.display().to_string())
            .collect::<Vec<_>>(),
        "names": [],
        "mappings": "",
    });

    let map_path = out_path.with_file_name(&map_name);
    fs::write(&map_path, serde_json::to_string(&map)?)?;

    Ok(map_name)
}

/// Trailer comment for CSS outputs.
pub fn css_trailer(map_name: &str) -> String {
    format!("/*# sourceMappingURL={map_name} */")
}

/// Trailer comment for JS outputs.
pub fn js_trailer(map_name: &str) -> String {
    format!("//# sourceMappingURL={map_name}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn writes_map_next_to_output() {
        let temp = tempdir().unwrap();
        let out = temp.path().join("main.min.js");

        let map_name = write_sibling(&out, &[Path::new("src/scripts/main.js")]).unwrap();

        assert_eq!(map_name, "main.min.js.map");
        let map = fs::read_to_string(temp.path().join("main.min.js.map")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&map).unwrap();
        assert_eq!(parsed["version"], 3);
        assert_eq!(parsed["file"], "main.min.js");
        assert_eq!(parsed["sources"][0], "src/scripts/main.js");
    }

    #[test]
    fn trailers_reference_the_map() {
        assert_eq!(
            css_trailer("main.css.map"),
            "/*# sourceMappingURL=main.css.map */"
        );
        assert_eq!(
            js_trailer("main.min.js.map"),
            "//# sourceMappingURL=main.min.js.map"
        );
    }
}
