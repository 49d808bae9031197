use std::fmt;

/// The type of value a declared parameter is bound to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Int,
    String,
    File,
}

impl fmt::Display for ParamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamKind::Int => "int",
            ParamKind::String => "string",
            ParamKind::File => "File",
        })
    }
}

/// A parameter read from the request's query string or form.
///
/// Declared parameters are matched, in order, against the handler's
/// non-implicit arguments.
///
/// ```
/// use fnapi::ParamSpec;
///
/// let params = vec![
///     ParamSpec::int("page"),
///     ParamSpec::string("query").required(),
/// ];
/// assert_eq!(params[1].to_string(), "query string (required)");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: String,
    pub kind: ParamKind,
    pub required: bool,
}

impl ParamSpec {
    pub fn new(name: impl Into<String>, kind: ParamKind, required: bool) -> Self {
        Self {
            name: name.into(),
            kind,
            required,
        }
    }

    /// An optional integer parameter.
    pub fn int(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::Int, false)
    }

    /// An optional text parameter.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::String, false)
    }

    /// An optional file upload.
    pub fn file(name: impl Into<String>) -> Self {
        Self::new(name, ParamKind::File, false)
    }

    /// Mark the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

impl fmt::Display for ParamSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.kind)?;

        if self.required {
            f.write_str(" (required)")?;
        }

        Ok(())
    }
}
