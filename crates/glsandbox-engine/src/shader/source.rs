use std::fs;
use std::path::Path;

use crate::error::{GraphicsError, Result};
use crate::gl::ShaderStage;

/// Line token that switches the active section.
pub const SECTION_MARKER: &str = "#shader";

/// Vertex and fragment sources split out of one combined shader file.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct ShaderProgramSource {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderProgramSource {
    /// Reads and splits a combined shader file.
    ///
    /// A missing or unreadable file is an error, not an empty pair.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| GraphicsError::ShaderSourceIo {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(parse_shader_source(&text))
    }

    pub fn stage(&self, stage: ShaderStage) -> &str {
        match stage {
            ShaderStage::Vertex => &self.vertex,
            ShaderStage::Fragment => &self.fragment,
        }
    }
}

/// Splits combined source text into its vertex and fragment sections.
///
/// Format:
///
/// ```text
/// #shader vertex
/// ...vertex source...
/// #shader fragment
/// ...fragment source...
/// ```
///
/// A line containing [`SECTION_MARKER`] selects the vertex section if it also
/// contains `vertex`, otherwise the fragment section if it contains
/// `fragment`; any other marker line leaves the selection unchanged. Marker
/// lines are never emitted. Lines before the first valid marker are dropped.
/// Every other line is appended verbatim to the active section, followed by
/// `\n`.
pub fn parse_shader_source(text: &str) -> ShaderProgramSource {
    let mut out = ShaderProgramSource::default();
    let mut active: Option<ShaderStage> = None;

    for line in text.lines() {
        if line.contains(SECTION_MARKER) {
            if line.contains("vertex") {
                active = Some(ShaderStage::Vertex);
            } else if line.contains("fragment") {
                active = Some(ShaderStage::Fragment);
            }
            continue;
        }

        let target = match active {
            Some(ShaderStage::Vertex) => &mut out.vertex,
            Some(ShaderStage::Fragment) => &mut out.fragment,
            None => continue,
        };
        target.push_str(line);
        target.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASIC: &str = "\
#shader vertex
#version 330 core
layout(location = 0) in vec4 position;
void main() { gl_Position = position; }
#shader fragment
#version 330 core
layout(location = 0) out vec4 color;
uniform vec4 u_Color;
void main() { color = u_Color; }
";

    #[test]
    fn splits_two_sections() {
        let src = parse_shader_source(BASIC);
        assert_eq!(
            src.vertex,
            "#version 330 core\n\
             layout(location = 0) in vec4 position;\n\
             void main() { gl_Position = position; }\n"
        );
        assert!(src.fragment.starts_with("#version 330 core\n"));
        assert!(src.fragment.ends_with("void main() { color = u_Color; }\n"));
    }

    #[test]
    fn concatenation_is_file_without_markers() {
        let src = parse_shader_source(BASIC);
        let expected: String = BASIC
            .lines()
            .filter(|l| !l.contains(SECTION_MARKER))
            .map(|l| format!("{l}\n"))
            .collect();
        assert_eq!(format!("{}{}", src.vertex, src.fragment), expected);
    }

    #[test]
    fn reversed_sections_are_assigned_by_keyword() {
        let src = parse_shader_source("#shader fragment\nF\n#shader vertex\nV\n");
        assert_eq!(src.vertex, "V\n");
        assert_eq!(src.fragment, "F\n");
    }

    #[test]
    fn unknown_marker_keeps_section_and_is_dropped() {
        let src = parse_shader_source("#shader vertex\na\n#shader geometry\nb\n#shader fragment\nc\n");
        assert_eq!(src.vertex, "a\nb\n");
        assert_eq!(src.fragment, "c\n");
    }

    #[test]
    fn lines_before_first_marker_are_dropped() {
        let src = parse_shader_source("// preamble\n#shader geometry\nstill dropped\n#shader vertex\nv\n");
        assert_eq!(src.vertex, "v\n");
        assert!(src.fragment.is_empty());
    }

    #[test]
    fn vertex_keyword_wins_on_ambiguous_marker() {
        let src = parse_shader_source("#shader vertex fragment\nx\n");
        assert_eq!(src.vertex, "x\n");
        assert!(src.fragment.is_empty());
    }

    #[test]
    fn marker_may_appear_anywhere_on_line() {
        let src = parse_shader_source("  // #shader fragment stage\nf\n");
        assert_eq!(src.fragment, "f\n");
    }

    #[test]
    fn blank_body_lines_are_kept() {
        let src = parse_shader_source("#shader vertex\n\nv\n\n");
        assert_eq!(src.vertex, "\nv\n\n");
    }

    #[test]
    fn empty_input_gives_empty_sources() {
        assert_eq!(parse_shader_source(""), ShaderProgramSource::default());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = ShaderProgramSource::from_file("does/not/exist.shader").unwrap_err();
        match err {
            GraphicsError::ShaderSourceIo { path, source } => {
                assert_eq!(path, Path::new("does/not/exist.shader"));
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn reads_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Basic.shader");
        fs::write(&path, BASIC).unwrap();

        let src = ShaderProgramSource::from_file(&path).unwrap();
        assert_eq!(src, parse_shader_source(BASIC));
        assert_eq!(src.stage(ShaderStage::Vertex), src.vertex);
    }
}
