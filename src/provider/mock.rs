//! Scripted in-memory provider and object store for tests

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};

use serde_json::{json, Value};

use super::{CallerIdentity, ObjectStore, Operation, RemoteProvider};
use crate::error::{ProviderError, ProviderErrorKind};

/// One recorded provider call
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub op: Operation,
    pub input: Value,
}

type Responder = Box<dyn Fn(&Value) -> Result<Value, ProviderError>>;

/// Provider answering from scripted handlers and recording every call
pub struct MockProvider {
    handlers: HashMap<Operation, Responder>,
    queued: RefCell<HashMap<Operation, VecDeque<Result<Value, ProviderError>>>>,
    calls: RefCell<Vec<Call>>,
    account: String,
}

impl MockProvider {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            handlers: HashMap::new(),
            queued: RefCell::new(HashMap::new()),
            calls: RefCell::new(Vec::new()),
            account: account.into(),
        }
    }

    /// Answer `op` with a handler computed from the request
    pub fn on<F>(mut self, op: Operation, handler: F) -> Self
    where
        F: Fn(&Value) -> Result<Value, ProviderError> + 'static,
    {
        self.handlers.insert(op, Box::new(handler));
        self
    }

    /// Answer `op` with the same response every time
    pub fn respond(self, op: Operation, response: Value) -> Self {
        self.on(op, move |_| Ok(response.clone()))
    }

    /// Answer the next call of `op` with `response`, ahead of any handler
    pub fn enqueue(self, op: Operation, response: Result<Value, ProviderError>) -> Self {
        self.queued
            .borrow_mut()
            .entry(op)
            .or_default()
            .push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn calls_to(&self, op: Operation) -> Vec<Value> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| call.op == op)
            .map(|call| call.input.clone())
            .collect()
    }

    /// Operations issued that change remote state, in order
    pub fn mutations(&self) -> Vec<Operation> {
        self.calls
            .borrow()
            .iter()
            .filter(|call| !call.op.is_read_only())
            .map(|call| call.op)
            .collect()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }
}

impl RemoteProvider for MockProvider {
    fn call(&self, op: Operation, input: &Value) -> Result<Value, ProviderError> {
        self.calls.borrow_mut().push(Call {
            op,
            input: input.clone(),
        });

        if let Some(response) = self
            .queued
            .borrow_mut()
            .get_mut(&op)
            .and_then(VecDeque::pop_front)
        {
            return response;
        }

        match self.handlers.get(&op) {
            Some(handler) => handler(input),
            None if op.is_read_only() => {
                Err(ProviderError::new(op.name(), "no scripted response"))
            }
            None => Ok(Value::Null),
        }
    }

    fn caller_identity(&self) -> Result<CallerIdentity, ProviderError> {
        Ok(CallerIdentity {
            account: self.account.clone(),
            arn: format!("arn:aws:iam::{}:user/tester", self.account),
            user_id: None,
        })
    }
}

/// Object store keeping objects in a map
#[derive(Default)]
pub struct MemoryStore {
    objects: RefCell<BTreeMap<(String, String), Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.objects
            .borrow()
            .keys()
            .filter(|(b, _)| b == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }

    pub fn get_json(&self, bucket: &str, key: &str) -> Option<Value> {
        self.objects
            .borrow()
            .get(&(bucket.to_string(), key.to_string()))
            .and_then(|bytes| serde_json::from_slice(bytes).ok())
    }

    pub fn insert(&self, bucket: &str, key: &str, body: &[u8]) {
        self.objects
            .borrow_mut()
            .insert((bucket.to_string(), key.to_string()), body.to_vec());
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), ProviderError> {
        self.insert(bucket, key, body);
        Ok(())
    }

    fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>, ProviderError> {
        self.objects
            .borrow()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| {
                ProviderError::new("get-object", format!("s3://{}/{} does not exist", bucket, key))
                    .with_kind(ProviderErrorKind::NotFound)
                    .with_code("NoSuchKey")
            })
    }
}

/// A one-page list response under `key`
pub fn page(key: &str, items: Vec<Value>) -> Value {
    let mut body = serde_json::Map::new();
    body.insert(key.to_string(), Value::Array(items));
    Value::Object(body)
}

/// Summary entries `{Id, Name}` for the given names, ids prefixed with `prefix`
pub fn summaries(prefix: &str, names: &[&str]) -> Vec<Value> {
    names
        .iter()
        .enumerate()
        .map(|(i, name)| json!({"Id": format!("{}-{}", prefix, i + 1), "Name": name}))
        .collect()
}
