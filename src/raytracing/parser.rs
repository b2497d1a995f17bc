use std::fmt;

use super::core::{MaterialKind, SceneDescription, SphereCenter, SphereDescription};
use super::math::Vec3;

pub struct SceneParser<'a> {
    content: &'a str,
    buffer: String,
    position: FilePosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilePosition {
    pub line: u32,
    pub column: u32,
    /// Byte offset into the content
    offset: usize,
}

impl FilePosition {
    fn new() -> Self {
        FilePosition {
            line: 0,
            column: 0,
            offset: 0,
        }
    }

    fn advance(&mut self, current_char: char) {
        if current_char == '\n' {
            self.line += 1;
            self.column = 0;
        } else {
            self.column += 1;
        }
        self.offset += current_char.len_utf8();
    }
}

#[derive(Debug)]
pub struct ParserError {
    pub position: FilePosition,
    pub message: String,
}

impl ParserError {
    fn new(message: &str, position: FilePosition) -> ParserError {
        ParserError {
            position,
            message: message.to_string(),
        }
    }

    /// The offending line with a caret under the error column.
    pub fn error_location(&self, content: &str) -> String {
        match content.lines().nth(self.position.line as usize) {
            Some(line) => {
                let spacing = " ".repeat(self.position.column as usize);
                format!("{}\n{}\n{}^", self, line, spacing)
            }
            None => self.to_string(),
        }
    }
}

impl fmt::Display for ParserError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} at {}:{}",
            self.message, self.position.line, self.position.column
        )
    }
}

impl std::error::Error for ParserError {}

type ParserResult<T> = Result<T, ParserError>;

/// Camera placement as written in the scene file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraSpec {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub up: Vec3,
    pub vertical_fov_degrees: f64,
}

impl Default for CameraSpec {
    fn default() -> Self {
        CameraSpec {
            look_from: Vec3::new(0.0, 1.0, 1.0),
            look_at: Vec3::new(0.0, 0.0, -1.0),
            up: Vec3::y_axis(),
            vertical_fov_degrees: 90.0,
        }
    }
}

#[derive(Debug)]
pub struct SceneFile {
    pub width: u32,
    pub height: u32,
    pub camera: CameraSpec,
    pub scene: SceneDescription,
}

impl<'a> SceneParser<'a> {
    pub fn new(content: &'a str) -> SceneParser<'a> {
        SceneParser {
            content,
            position: FilePosition::new(),
            buffer: String::new(),
        }
    }

    fn get_current_char(&self) -> Option<char> {
        self.content
            .get(self.position.offset..)
            .and_then(|rest| rest.chars().next())
    }

    fn is_empty(&mut self) -> bool {
        self.buffer.is_empty() && {
            self.eat_spaces();
            self.get_current_char().is_none()
        }
    }

    fn advance(&mut self) {
        if let Some(current_char) = self.get_current_char() {
            self.position.advance(current_char);
        }
    }

    fn advance_until(&mut self, f: impl Fn(char) -> bool) {
        while let Some(current_char) = self.get_current_char() {
            if f(current_char) {
                break;
            }
            self.advance();
        }
    }

    fn eat_spaces(&mut self) {
        // skip whitespace and `#` comments up to the next token
        while let Some(current_char) = self.get_current_char() {
            if current_char == '#' {
                // the newline itself is consumed below
                self.advance_until(|c| c == '\n');
            } else if !current_char.is_whitespace() {
                break;
            }
            self.advance();
        }
    }

    fn push_current(&mut self, result: &mut String) -> Option<char> {
        if let Some(current_char) = self.get_current_char() {
            result.push(current_char);
            self.advance();
        }
        self.get_current_char()
    }

    fn pop(&mut self) -> String {
        if !self.buffer.is_empty() {
            return std::mem::take(&mut self.buffer);
        }

        self.eat_spaces();
        let mut result = String::new();
        let Some(current_char) = self.get_current_char() else {
            return result;
        };

        match current_char {
            ',' | '(' | ')' | ':' => {
                self.advance();
                result.push(current_char);
            }
            '.' | '+' | '-' | '0'..='9' => {
                let mut next = Some(current_char);
                if current_char == '+' || current_char == '-' {
                    next = self.push_current(&mut result);
                }
                while next.is_some_and(|c| c.is_ascii_digit()) {
                    next = self.push_current(&mut result);
                }
                if next == Some('.') {
                    next = self.push_current(&mut result);
                    while next.is_some_and(|c| c.is_ascii_digit()) {
                        next = self.push_current(&mut result);
                    }
                }
                if matches!(next, Some('e') | Some('E')) {
                    next = self.push_current(&mut result);
                    if matches!(next, Some('+') | Some('-')) {
                        next = self.push_current(&mut result);
                    }
                    while next.is_some_and(|c| c.is_ascii_digit()) {
                        next = self.push_current(&mut result);
                    }
                }
            }
            c if c.is_alphabetic() => {
                let mut next = Some(c);
                while next.is_some_and(|c| c.is_alphabetic() || c == '_') {
                    next = self.push_current(&mut result);
                }
            }
            _ => {
                // unknown symbol: hand it to the caller so it can report it
                self.advance();
                result.push(current_char);
            }
        }
        result
    }

    fn peek(&mut self) -> &str {
        if self.buffer.is_empty() {
            self.buffer = self.pop();
        }
        &self.buffer
    }

    fn error<T>(&self, message: &str) -> ParserResult<T> {
        Err(ParserError::new(message, self.position))
    }

    fn parse_float(&mut self) -> ParserResult<f64> {
        let next_token = self.pop();
        match next_token.parse::<f64>() {
            Ok(num) => Ok(num),
            Err(_) => {
                let message = format!("cannot interpret '{}' as a number", next_token);
                self.error(&message)
            }
        }
    }

    fn parse_dimension(&mut self) -> ParserResult<u32> {
        let value = self.parse_float()?;
        if value >= 1.0 && value.fract() == 0.0 && value <= u32::MAX as f64 {
            Ok(value as u32)
        } else {
            self.error(&format!("image size must be a positive integer, got {}", value))
        }
    }

    fn match_token(&mut self, expected_lexem: &str) -> ParserResult<()> {
        let next_lexem = self.pop();
        if next_lexem != expected_lexem {
            let message = format!(
                "expected '{}', getting '{}' instead",
                expected_lexem, next_lexem
            );
            self.error(&message)
        } else {
            Ok(())
        }
    }

    /// Consumes the next token only when it is `expected_lexem`.
    fn maybe_match(&mut self, expected_lexem: &str) -> bool {
        if self.peek() == expected_lexem {
            self.pop();
            return true;
        }
        false
    }

    fn parse_header(&mut self) -> ParserResult<(u32, u32)> {
        self.match_token("size")?;
        let width = self.parse_dimension()?;
        let height = self.parse_dimension()?;
        Ok((width, height))
    }

    fn parse_vec3(&mut self) -> ParserResult<Vec3> {
        self.match_token("(")?;
        let x = self.parse_float()?;
        self.match_token(",")?;
        let y = self.parse_float()?;
        self.match_token(",")?;
        let z = self.parse_float()?;
        self.match_token(")")?;
        Ok(Vec3::new(x, y, z))
    }

    fn parse_color(&mut self) -> ParserResult<Vec3> {
        const NAMED: [(&str, Vec3); 10] = [
            ("red", Vec3::new(1.0, 0.0, 0.0)),
            ("blue", Vec3::new(0.0, 0.0, 1.0)),
            ("green", Vec3::new(0.0, 1.0, 0.0)),
            ("white", Vec3::new(1.0, 1.0, 1.0)),
            ("black", Vec3::new(0.0, 0.0, 0.0)),
            ("cyan", Vec3::new(0.0, 1.0, 1.0)),
            ("violet", Vec3::new(1.0, 0.0, 1.0)),
            ("fuchsia", Vec3::new(0.96, 0.0, 0.96)),
            ("yellow", Vec3::new(1.0, 1.0, 0.0)),
            ("orange", Vec3::new(0.98, 0.45, 0.02)),
        ];
        for (name, color) in NAMED {
            if self.maybe_match(name) {
                return Ok(color);
            }
        }
        self.parse_vec3()
    }

    fn parse_material(&mut self) -> ParserResult<(MaterialKind, Vec3)> {
        let mut material = MaterialKind::Diffuse;
        for (name, kind) in [
            ("specular", MaterialKind::Specular),
            ("diffuse", MaterialKind::Diffuse),
            ("emissive", MaterialKind::Emissive),
        ] {
            if self.maybe_match(name) {
                material = kind;
                self.match_token(":")?;
                break;
            }
        }
        let albedo = self.parse_color()?;
        Ok((material, albedo))
    }

    fn parse_sphere(&mut self) -> ParserResult<SphereDescription> {
        self.match_token("sphere")?;
        let center = if self.maybe_match("orbit") {
            let pivot = self.parse_vec3()?;
            let radius = self.parse_float()?;
            SphereCenter::Orbit { pivot, radius }
        } else {
            SphereCenter::Fixed(self.parse_vec3()?)
        };
        let radius = self.parse_float()?;
        if !(radius > 0.0) {
            return self.error(&format!("sphere radius must be positive, got {}", radius));
        }
        let (material, albedo) = self.parse_material()?;
        Ok(SphereDescription {
            center,
            radius,
            albedo,
            material,
        })
    }

    fn parse_camera(&mut self) -> ParserResult<CameraSpec> {
        let mut camera = CameraSpec::default();
        if !self.maybe_match("camera") {
            return Ok(camera);
        }
        if self.maybe_match("from") {
            camera.look_from = self.parse_vec3()?;
        }
        if self.maybe_match("to") {
            camera.look_at = self.parse_vec3()?;
        }
        if self.maybe_match("up") {
            camera.up = self.parse_vec3()?;
        }
        if self.maybe_match("fov") {
            camera.vertical_fov_degrees = self.parse_float()?;
        }
        Ok(camera)
    }

    pub fn parse_scene(&mut self) -> ParserResult<SceneFile> {
        let (width, height) = self.parse_header()?;
        let camera = self.parse_camera()?;

        let mut spheres = Vec::new();
        while !self.is_empty() {
            let next_token = self.peek();
            match next_token {
                "sphere" => {
                    let sphere = self.parse_sphere()?;
                    spheres.push(sphere);
                }
                _ => {
                    let message = format!("unexpected token '{}'", next_token);
                    return self.error(&message);
                }
            }
        }
        Ok(SceneFile {
            width,
            height,
            camera,
            scene: SceneDescription { spheres },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: &str = "
size 640 480
# eye above and behind the scene
camera from (0, 1, 1) to (0, 0, -1) up (0, 1, 0) fov 75
sphere (0, 0.4, -1) 0.8 diffuse: (0.5, 1, 1)
sphere orbit (0, -0.1, -1) 1 0.3 specular: yellow
sphere (1, 0.7, 0) 0.1 emissive: (30, 0, 0)
sphere (-1, 0.4, -1) .2 orange
";

    #[test]
    fn test_parse_full_scene() {
        let file = SceneParser::new(REFERENCE).parse_scene().unwrap();
        assert_eq!((file.width, file.height), (640, 480));
        assert_eq!(file.camera.look_from, Vec3::new(0.0, 1.0, 1.0));
        assert_eq!(file.camera.vertical_fov_degrees, 75.0);

        let spheres = &file.scene.spheres;
        assert_eq!(spheres.len(), 4);
        assert_eq!(spheres[0].material, MaterialKind::Diffuse);
        assert_eq!(
            spheres[1].center,
            SphereCenter::Orbit {
                pivot: Vec3::new(0.0, -0.1, -1.0),
                radius: 1.0
            }
        );
        assert_eq!(spheres[1].material, MaterialKind::Specular);
        assert_eq!(spheres[1].albedo, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(spheres[2].material, MaterialKind::Emissive);
        assert_eq!(spheres[2].albedo, Vec3::new(30.0, 0.0, 0.0));
        assert_eq!(spheres[3].radius, 0.2);
        assert_eq!(spheres[3].material, MaterialKind::Diffuse);
    }

    #[test]
    fn test_camera_is_optional() {
        let file = SceneParser::new("size 4 4\nsphere (0, 0, -1) 0.5 white")
            .parse_scene()
            .unwrap();
        assert_eq!(file.camera, CameraSpec::default());
        assert_eq!(file.scene.spheres.len(), 1);
    }

    #[test]
    fn test_exponent_numbers() {
        let file = SceneParser::new("size 2 2 sphere (0, 0, -1e1) 5e-1 red")
            .parse_scene()
            .unwrap();
        let sphere = file.scene.spheres[0];
        assert_eq!(sphere.center, SphereCenter::Fixed(Vec3::new(0.0, 0.0, -10.0)));
        assert_eq!(sphere.radius, 0.5);
    }

    #[test]
    fn test_error_reports_position() {
        let content = "size 2 2\nsphere (0, 0 -1) 1 red";
        let err = SceneParser::new(content).parse_scene().unwrap_err();
        assert_eq!(err.position.line, 1);
        assert!(err.message.contains("expected ','"), "{}", err.message);
        let location = err.error_location(content);
        assert!(location.contains("sphere (0, 0 -1) 1 red"));
        assert!(location.ends_with('^'));
    }

    #[test]
    fn test_positions_count_characters_not_bytes() {
        let content = "size 2 2\n# caf\u{e9} \u{2600}\nsphere (0, 0, -1) 1 \u{e9}";
        let err = SceneParser::new(content).parse_scene().unwrap_err();
        assert_eq!(err.position.line, 2);
        assert_eq!(err.position.column, 21);
    }

    #[test]
    fn test_long_scene_file() {
        let mut content = String::from("size 8 8\n");
        for i in 0..5000 {
            content.push_str(&format!(
                "sphere ({}, 0, -10) 0.25 diffuse: (0.5, 0.5, 0.5)\n",
                i
            ));
        }
        let file = SceneParser::new(&content).parse_scene().unwrap();
        assert_eq!(file.scene.spheres.len(), 5000);
        assert_eq!(
            file.scene.spheres[4999].center,
            SphereCenter::Fixed(Vec3::new(4999.0, 0.0, -10.0))
        );
    }

    #[test]
    fn test_rejects_unknown_objects_and_bad_sizes() {
        assert!(SceneParser::new("size 2 2\nplane (0, 1, 0) 1 red")
            .parse_scene()
            .is_err());
        assert!(SceneParser::new("size 0 2").parse_scene().is_err());
        assert!(SceneParser::new("size 2 2\nsphere (0, 0, 0) -1 red")
            .parse_scene()
            .is_err());
    }
}
