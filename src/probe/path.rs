use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path data at offset {offset}: {message}")]
pub struct PathDataError {
    pub offset: usize,
    pub message: String,
}

/// One segment of a parsed path, in absolute coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    MoveTo {
        x: f32,
        y: f32,
    },
    LineTo {
        x: f32,
        y: f32,
    },
    QuadTo {
        x1: f32,
        y1: f32,
        x: f32,
        y: f32,
    },
    CubicTo {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        x: f32,
        y: f32,
    },
    ArcTo {
        rx: f32,
        ry: f32,
        rotation: f32,
        large_arc: bool,
        sweep: bool,
        x: f32,
        y: f32,
    },
    Close,
}

/// Icon-mask outline in its 100x100 viewport.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IconPath {
    commands: Vec<PathCommand>,
}

impl IconPath {
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_closed(&self) -> bool {
        matches!(self.commands.last(), Some(PathCommand::Close))
    }

    /// Parse SVG path data: `M L H V C S Q T A Z`, upper case absolute and
    /// lower case relative, with implicit command repetition.
    pub fn parse(data: &str) -> Result<Self, PathDataError> {
        PathParser::new(data).parse()
    }
}

struct PathParser<'a> {
    bytes: &'a [u8],
    pos: usize,
    commands: Vec<PathCommand>,
    current: (f32, f32),
    subpath_start: (f32, f32),
    last_cubic_ctrl: Option<(f32, f32)>,
    last_quad_ctrl: Option<(f32, f32)>,
}

impl<'a> PathParser<'a> {
    fn new(data: &'a str) -> Self {
        Self {
            bytes: data.as_bytes(),
            pos: 0,
            commands: Vec::new(),
            current: (0.0, 0.0),
            subpath_start: (0.0, 0.0),
            last_cubic_ctrl: None,
            last_quad_ctrl: None,
        }
    }

    fn parse(mut self) -> Result<IconPath, PathDataError> {
        let mut previous: Option<u8> = None;
        loop {
            self.skip_separators();
            let Some(&byte) = self.bytes.get(self.pos) else {
                break;
            };
            let command = if byte.is_ascii_alphabetic() {
                self.pos += 1;
                byte
            } else {
                // Numbers after a command repeat it; after a moveto they are linetos.
                match previous {
                    Some(b'M') => b'L',
                    Some(b'm') => b'l',
                    Some(b'Z' | b'z') | None => {
                        return Err(self.error("expected a command"));
                    }
                    Some(other) => other,
                }
            };
            if previous.is_none() && !matches!(command, b'M' | b'm') {
                return Err(self.error("path data must start with a moveto"));
            }
            self.segment(command)?;
            previous = Some(command);
        }
        Ok(IconPath {
            commands: self.commands,
        })
    }

    fn segment(&mut self, command: u8) -> Result<(), PathDataError> {
        let relative = command.is_ascii_lowercase();
        let (cx, cy) = self.current;
        let offset = |x: f32, y: f32| if relative { (cx + x, cy + y) } else { (x, y) };
        let mut cubic_ctrl = None;
        let mut quad_ctrl = None;

        match command.to_ascii_uppercase() {
            b'M' => {
                let (x, y) = offset(self.number()?, self.number()?);
                self.commands.push(PathCommand::MoveTo { x, y });
                self.current = (x, y);
                self.subpath_start = (x, y);
            }
            b'L' => {
                let (x, y) = offset(self.number()?, self.number()?);
                self.line_to(x, y);
            }
            b'H' => {
                let value = self.number()?;
                let x = if relative { cx + value } else { value };
                self.line_to(x, cy);
            }
            b'V' => {
                let value = self.number()?;
                let y = if relative { cy + value } else { value };
                self.line_to(cx, y);
            }
            b'C' => {
                let (x1, y1) = offset(self.number()?, self.number()?);
                let (x2, y2) = offset(self.number()?, self.number()?);
                let (x, y) = offset(self.number()?, self.number()?);
                self.commands.push(PathCommand::CubicTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                });
                self.current = (x, y);
                cubic_ctrl = Some((x2, y2));
            }
            b'S' => {
                let (x1, y1) = reflect(self.last_cubic_ctrl, self.current);
                let (x2, y2) = offset(self.number()?, self.number()?);
                let (x, y) = offset(self.number()?, self.number()?);
                self.commands.push(PathCommand::CubicTo {
                    x1,
                    y1,
                    x2,
                    y2,
                    x,
                    y,
                });
                self.current = (x, y);
                cubic_ctrl = Some((x2, y2));
            }
            b'Q' => {
                let (x1, y1) = offset(self.number()?, self.number()?);
                let (x, y) = offset(self.number()?, self.number()?);
                self.commands.push(PathCommand::QuadTo { x1, y1, x, y });
                self.current = (x, y);
                quad_ctrl = Some((x1, y1));
            }
            b'T' => {
                let (x1, y1) = reflect(self.last_quad_ctrl, self.current);
                let (x, y) = offset(self.number()?, self.number()?);
                self.commands.push(PathCommand::QuadTo { x1, y1, x, y });
                self.current = (x, y);
                quad_ctrl = Some((x1, y1));
            }
            b'A' => {
                let rx = self.number()?.abs();
                let ry = self.number()?.abs();
                let rotation = self.number()?;
                let large_arc = self.flag()?;
                let sweep = self.flag()?;
                let (x, y) = offset(self.number()?, self.number()?);
                self.commands.push(PathCommand::ArcTo {
                    rx,
                    ry,
                    rotation,
                    large_arc,
                    sweep,
                    x,
                    y,
                });
                self.current = (x, y);
            }
            b'Z' => {
                self.commands.push(PathCommand::Close);
                self.current = self.subpath_start;
            }
            _ => {
                self.pos -= 1;
                return Err(self.error(&format!("unknown command '{}'", command as char)));
            }
        }

        self.last_cubic_ctrl = cubic_ctrl;
        self.last_quad_ctrl = quad_ctrl;
        Ok(())
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::LineTo { x, y });
        self.current = (x, y);
    }

    fn skip_separators(&mut self) {
        while let Some(&byte) = self.bytes.get(self.pos) {
            if byte.is_ascii_whitespace() || byte == b',' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    fn flag(&mut self) -> Result<bool, PathDataError> {
        self.skip_separators();
        match self.bytes.get(self.pos) {
            Some(b'0') => {
                self.pos += 1;
                Ok(false)
            }
            Some(b'1') => {
                self.pos += 1;
                Ok(true)
            }
            _ => Err(self.error("expected an arc flag")),
        }
    }

    /// Scans one number. Accepts the compact forms `.5.5` and `1-2`.
    fn number(&mut self) -> Result<f32, PathDataError> {
        self.skip_separators();
        let start = self.pos;
        let mut end = self.pos;
        if matches!(self.bytes.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        let mut seen_digit = false;
        let mut seen_dot = false;
        while let Some(&byte) = self.bytes.get(end) {
            match byte {
                b'0'..=b'9' => seen_digit = true,
                b'.' if !seen_dot => seen_dot = true,
                _ => break,
            }
            end += 1;
        }
        if !seen_digit {
            return Err(self.error("expected a number"));
        }
        if matches!(self.bytes.get(end), Some(b'e' | b'E')) {
            let mut exp_end = end + 1;
            if matches!(self.bytes.get(exp_end), Some(b'+' | b'-')) {
                exp_end += 1;
            }
            let digits_start = exp_end;
            while self.bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
                exp_end += 1;
            }
            if exp_end > digits_start {
                end = exp_end;
            }
        }

        let text = std::str::from_utf8(&self.bytes[start..end])
            .map_err(|_| self.error("number is not valid utf-8"))?;
        let value = text
            .parse::<f32>()
            .map_err(|err| self.error(&format!("invalid number '{text}': {err}")))?;
        self.pos = end;
        Ok(value)
    }

    fn error(&self, message: &str) -> PathDataError {
        PathDataError {
            offset: self.pos,
            message: message.to_string(),
        }
    }
}

fn reflect(control: Option<(f32, f32)>, current: (f32, f32)) -> (f32, f32) {
    match control {
        Some((x, y)) => (2.0 * current.0 - x, 2.0 * current.1 - y),
        None => current,
    }
}
