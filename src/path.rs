use std::fmt;
use std::str::FromStr;

use crate::error::PathError;
use crate::value::ValueType;

/// A parsed path like `1.2.4:string`: field numbers separated by dots,
/// optionally followed by a value type on the last segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Path {
    fields: Vec<u32>,
    value_type: Option<ValueType>,
}

impl Path {
    pub fn new(fields: Vec<u32>, value_type: Option<ValueType>) -> Result<Self, PathError> {
        if fields.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self { fields, value_type })
    }

    pub fn fields(&self) -> &[u32] {
        &self.fields
    }

    pub fn value_type(&self) -> Option<ValueType> {
        self.value_type
    }

    /// Prepends the fields of `prefix`, which must not carry a value type.
    pub fn prefixed(mut self, prefix: &Path) -> Result<Self, PathError> {
        if prefix.value_type.is_some() {
            return Err(PathError::TypeOnInnerSegment {
                index: prefix.fields.len() - 1,
            });
        }
        let mut fields = prefix.fields.clone();
        fields.extend_from_slice(&self.fields);
        self.fields = fields;
        Ok(self)
    }
}

impl FromStr for Path {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(PathError::Empty);
        }
        let segments: Vec<&str> = s.split('.').collect();
        let last = segments.len() - 1;

        let mut fields = Vec::with_capacity(segments.len());
        let mut value_type = None;
        for (index, segment) in segments.into_iter().enumerate() {
            let number = match segment.split_once(':') {
                Some(_) if index != last => return Err(PathError::TypeOnInnerSegment { index }),
                Some((number, label)) => {
                    value_type = Some(label.parse()?);
                    number
                }
                None => segment,
            };
            fields.push(parse_field_number(number, index)?);
        }

        Ok(Self { fields, value_type })
    }
}

fn parse_field_number(number: &str, index: usize) -> Result<u32, PathError> {
    if number.is_empty() {
        return Err(PathError::EmptySegment { index });
    }
    // u32::from_str accepts a leading '+'
    if !number.bytes().all(|b| b.is_ascii_digit()) {
        return Err(PathError::InvalidFieldNumber(number.to_string()));
    }
    number
        .parse()
        .map_err(|_| PathError::InvalidFieldNumber(number.to_string()))
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, number) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{number}")?;
        }
        if let Some(value_type) = self.value_type {
            write!(f, ":{value_type}")?;
        }
        Ok(())
    }
}
