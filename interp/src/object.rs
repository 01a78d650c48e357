//! object mod contains the low level pdf objects consumed by the interpreter.
//!
//! Parsing and decoding of the file structure is done elsewhere, objects here
//! are already materialized, streams hold decoded bytes.
use ahash::HashMap;
use educe::Educe;
use std::{fmt::Debug, num::NonZeroU32, sync::Arc};

/// PDF Name value
pub type Name = kstring::KStringBase<Box<str>>;
pub type Array = Vec<Object>;

/// Create Name from `&str`
pub fn name(s: &str) -> Name {
    Name::from_ref(s)
}

/// Create Name from static str, no allocation.
pub const fn sname(s: &'static str) -> Name {
    Name::from_static(s)
}

static NULL: Object = Object::Null;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId {
    id: NonZeroU32,
    generation: u16,
}

impl ObjectId {
    pub fn new(id: NonZeroU32, generation: u16) -> Self {
        Self { id, generation }
    }

    /// Return None if `id` is zero, object number 0 is reserved.
    pub fn new_u32(id: u32, generation: u16) -> Option<Self> {
        NonZeroU32::new(id).map(|id| Self::new(id, generation))
    }

    pub fn id(&self) -> NonZeroU32 {
        self.id
    }

    pub fn generation(&self) -> u16 {
        self.generation
    }
}

#[derive(PartialEq, Debug, Clone, Default, Educe)]
#[educe(Deref, DerefMut)]
pub struct Dictionary(HashMap<Name, Object>);

impl FromIterator<(Name, Object)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (Name, Object)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Dictionary {
    pub fn new() -> Self {
        Self(HashMap::default())
    }

    pub fn set(&mut self, id: impl Into<Name>, value: impl Into<Object>) {
        self.0.insert(id.into(), value.into());
    }

    /// Get value of `key`, returns `Object::Null` if not exist.
    pub fn get_or_null(&self, key: &str) -> &Object {
        self.0.get(key).unwrap_or(&NULL)
    }

    pub fn get_name(&self, key: &str) -> Option<&Name> {
        self.0.get(key).and_then(|o| o.as_name().ok())
    }

    pub fn get_int(&self, key: &str, default: i32) -> Result<i32, ObjectValueError> {
        self.0.get(key).map_or(Ok(default), |o| o.as_int())
    }

    pub fn get_number(&self, key: &str, default: f32) -> Result<f32, ObjectValueError> {
        self.0.get(key).map_or(Ok(default), |o| o.as_number())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> Result<bool, ObjectValueError> {
        self.0.get(key).map_or(Ok(default), |o| o.as_bool())
    }
}

/// Stream object, `data` already decoded by filters.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    dict: Dictionary,
    data: Arc<[u8]>,
}

impl Stream {
    pub fn new(dict: Dictionary, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            dict,
            data: data.into(),
        }
    }

    pub fn as_dict(&self) -> &Dictionary {
        &self.dict
    }

    pub fn data(&self) -> &Arc<[u8]> {
        &self.data
    }
}

#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum ObjectValueError {
    #[error("unexpected type")]
    UnexpectedType,
    #[error("invalid name format")]
    InvalidNameFormat,
    #[error("Dict key not found: {0}")]
    DictKeyNotFound(Name),
    #[error("Object not found by id {0}")]
    ObjectIDNotFound(NonZeroU32),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Object {
    #[default]
    Null,
    Bool(bool),
    Integer(i32),
    Number(f32),
    String(Vec<u8>),
    Name(Name),
    Dictionary(Dictionary),
    Array(Array),
    Stream(Stream),
    Reference(ObjectId),
}

macro_rules! from_value {
    ($t:ty, $branch:ident) => {
        impl From<$t> for Object {
            fn from(v: $t) -> Self {
                Self::$branch(v)
            }
        }
    };
}

from_value!(bool, Bool);
from_value!(i32, Integer);
from_value!(f32, Number);
from_value!(Name, Name);
from_value!(Dictionary, Dictionary);
from_value!(Array, Array);
from_value!(Stream, Stream);
from_value!(ObjectId, Reference);

impl From<&str> for Object {
    fn from(s: &str) -> Self {
        Self::Name(name(s))
    }
}

impl Object {
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_bool(&self) -> Result<bool, ObjectValueError> {
        match self {
            Object::Bool(b) => Ok(*b),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn as_int(&self) -> Result<i32, ObjectValueError> {
        match self {
            Object::Integer(i) => Ok(*i),
            #[allow(clippy::cast_possible_truncation)]
            Object::Number(f) => Ok(*f as i32),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn as_number(&self) -> Result<f32, ObjectValueError> {
        match self {
            Object::Number(f) => Ok(*f),
            Object::Integer(v) => Ok(*v as f32),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn as_name(&self) -> Result<&Name, ObjectValueError> {
        match self {
            Object::Name(n) => Ok(n),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn as_string(&self) -> Result<&[u8], ObjectValueError> {
        match self {
            Object::String(s) => Ok(s),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    /// Stream object returns its dictionary.
    pub fn as_dict(&self) -> Result<&Dictionary, ObjectValueError> {
        match self {
            Object::Dictionary(d) => Ok(d),
            Object::Stream(s) => Ok(s.as_dict()),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn as_stream(&self) -> Result<&Stream, ObjectValueError> {
        match self {
            Object::Stream(s) => Ok(s),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn as_arr(&self) -> Result<&Array, ObjectValueError> {
        match self {
            Object::Array(a) => Ok(a),
            _ => Err(ObjectValueError::UnexpectedType),
        }
    }

    pub fn as_reference(&self) -> Option<ObjectId> {
        match self {
            Object::Reference(id) => Some(*id),
            _ => None,
        }
    }
}

/// Resolves indirect references to the objects they point to.
pub trait Resolver {
    /// Returns the referenced object if the object is a reference, returns
    /// `Object::Null` if the reference target does not exist. Direct objects
    /// are returned as is.
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object;

    /// Get value of `key` from dictionary, resolved. `Object::Null` if not exist.
    fn get<'a>(&'a self, dict: &'a Dictionary, key: &str) -> &'a Object {
        self.resolve(dict.get_or_null(key))
    }

    /// Get resolved dictionary value of `key`, None if not exist or not a dictionary.
    fn get_dict<'a>(&'a self, dict: &'a Dictionary, key: &str) -> Option<&'a Dictionary> {
        self.get(dict, key).as_dict().ok()
    }
}

/// Resolver with no indirect objects, every reference resolves to `Null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectObjects;

impl Resolver for DirectObjects {
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(_) => &NULL,
            _ => obj,
        }
    }
}

/// Resolver backed by an in-memory table of indirect objects.
#[derive(Debug, Clone, Default)]
pub struct ObjectTable(HashMap<ObjectId, Object>);

impl ObjectTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: ObjectId, obj: impl Into<Object>) {
        self.0.insert(id, obj.into());
    }
}

impl Resolver for ObjectTable {
    fn resolve<'a>(&'a self, obj: &'a Object) -> &'a Object {
        match obj {
            Object::Reference(id) => self.0.get(id).unwrap_or(&NULL),
            _ => obj,
        }
    }
}
