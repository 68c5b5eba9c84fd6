use std::any::Any;
use std::collections::HashMap;

pub trait PropertyTreeReader {
    fn get_string(&self, path: &str) -> anyhow::Result<String>;
}

pub trait PropertyTreeWriter {
    fn clear(&mut self) -> anyhow::Result<()>;
    fn put_string(&mut self, path: &str, value: &str) -> anyhow::Result<()>;
    fn put_u64(&mut self, path: &str, value: u64) -> anyhow::Result<()>;
    fn as_any(&self) -> &dyn Any;
    fn to_json(&self) -> String;
}

pub struct TestPropertyTree {
    properties: HashMap<String, String>,
}

impl TestPropertyTree {
    pub fn new() -> Self {
        Self {
            properties: HashMap::new(),
        }
    }
}

impl Default for TestPropertyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyTreeReader for TestPropertyTree {
    fn get_string(&self, path: &str) -> anyhow::Result<String> {
        self.properties
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow!("path not found"))
    }
}

impl PropertyTreeWriter for TestPropertyTree {
    fn put_string(&mut self, path: &str, value: &str) -> anyhow::Result<()> {
        self.properties.insert(path.to_owned(), value.to_owned());
        Ok(())
    }

    fn put_u64(&mut self, path: &str, value: u64) -> anyhow::Result<()> {
        self.put_string(path, &value.to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clear(&mut self) -> anyhow::Result<()> {
        self.properties.clear();
        Ok(())
    }

    fn to_json(&self) -> String {
        unimplemented!()
    }
}

pub struct SerdePropertyTree {
    value: serde_json::Value,
}

impl SerdePropertyTree {
    pub fn new() -> Self {
        Self {
            value: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    pub fn parse(s: &str) -> anyhow::Result<Self> {
        Ok(Self {
            value: serde_json::from_str(s)?,
        })
    }
}

impl Default for SerdePropertyTree {
    fn default() -> Self {
        Self::new()
    }
}

impl PropertyTreeReader for SerdePropertyTree {
    fn get_string(&self, path: &str) -> anyhow::Result<String> {
        match self.value.get(path) {
            Some(serde_json::Value::String(s)) => Ok(s.to_owned()),
            Some(_) => Err(anyhow!("not a string value")),
            None => Err(anyhow!("could not find path")),
        }
    }
}

impl PropertyTreeWriter for SerdePropertyTree {
    fn clear(&mut self) -> anyhow::Result<()> {
        self.value = serde_json::Value::Object(serde_json::Map::new());
        Ok(())
    }

    fn put_string(&mut self, path: &str, value: &str) -> anyhow::Result<()> {
        let serde_json::Value::Object(map) = &mut self.value else {
            bail!("not an object");
        };
        map.insert(
            path.to_owned(),
            serde_json::Value::String(value.to_owned()),
        );
        Ok(())
    }

    fn put_u64(&mut self, path: &str, value: u64) -> anyhow::Result<()> {
        self.put_string(path, &value.to_string())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn to_json(&self) -> String {
        self.value.to_string()
    }
}
