//! Command handler for the RESP front end

use std::sync::Arc;

use bytes::Bytes;
use slablru::LruCache;

use crate::resp::RespValue;

/// Cache type served by the daemon
pub type SharedCache = Arc<LruCache<Bytes, Bytes>>;

/// Maps RESP commands onto cache operations
pub struct CommandHandler {
    cache: SharedCache,
}

impl CommandHandler {
    pub fn new(cache: SharedCache) -> Self {
        Self { cache }
    }

    pub fn handle(&self, cmd: RespValue) -> RespValue {
        let args = match cmd {
            RespValue::Array(Some(args)) if !args.is_empty() => args,
            _ => return RespValue::error("ERR invalid command format"),
        };

        let name = match &args[0] {
            RespValue::BulkString(Some(name)) => String::from_utf8_lossy(name).to_uppercase(),
            _ => return RespValue::error("ERR invalid command"),
        };
        let args = &args[1..];

        match name.as_str() {
            "PING" => self.ping(args),
            "ECHO" => self.echo(args),
            "GET" => self.get(args),
            "SET" => self.set(args),
            "EXISTS" => self.exists(args),
            "DBSIZE" => RespValue::Integer(self.cache.len() as i64),
            "INFO" => self.info(),
            "COMMAND" => RespValue::Array(Some(vec![])), // redis-cli sends this on connect
            _ => RespValue::error(format!("ERR unknown command '{}'", name)),
        }
    }

    fn ping(&self, args: &[RespValue]) -> RespValue {
        match args {
            [] => RespValue::SimpleString("PONG".to_string()),
            [msg] => msg.clone(),
            _ => wrong_arity("ping"),
        }
    }

    fn echo(&self, args: &[RespValue]) -> RespValue {
        match args {
            [msg] => msg.clone(),
            _ => wrong_arity("echo"),
        }
    }

    fn get(&self, args: &[RespValue]) -> RespValue {
        let [key] = args else {
            return wrong_arity("get");
        };
        let Some(key) = as_bytes(key) else {
            return RespValue::error("ERR invalid key type");
        };

        RespValue::BulkString(self.cache.get(&key[..]))
    }

    fn set(&self, args: &[RespValue]) -> RespValue {
        let [key, value] = args else {
            return wrong_arity("set");
        };
        let (Some(key), Some(value)) = (as_bytes(key), as_bytes(value)) else {
            return RespValue::error("ERR invalid key or value type");
        };

        self.cache.put(key.clone(), value.clone());
        RespValue::ok()
    }

    fn exists(&self, args: &[RespValue]) -> RespValue {
        if args.is_empty() {
            return wrong_arity("exists");
        }

        let count = args
            .iter()
            .filter_map(as_bytes)
            .filter(|key| self.cache.contains(&key[..]))
            .count();
        RespValue::Integer(count as i64)
    }

    fn info(&self) -> RespValue {
        let stats = self.cache.stats().snapshot();
        let info = format!(
            "# Server\r\n\
             slabd_version:{}\r\n\
             \r\n\
             # Cache\r\n\
             cache_size:{}\r\n\
             cache_capacity:{}\r\n\
             cache_hits:{}\r\n\
             cache_misses:{}\r\n\
             cache_inserts:{}\r\n\
             cache_updates:{}\r\n\
             cache_evictions:{}\r\n\
             cache_hit_ratio:{:.2}\r\n",
            env!("CARGO_PKG_VERSION"),
            self.cache.len(),
            self.cache.capacity(),
            stats.hits,
            stats.misses,
            stats.inserts,
            stats.updates,
            stats.evictions,
            stats.hit_ratio(),
        );
        RespValue::bulk(info)
    }
}

fn as_bytes(value: &RespValue) -> Option<&Bytes> {
    match value {
        RespValue::BulkString(Some(data)) => Some(data),
        _ => None,
    }
}

fn wrong_arity(cmd: &str) -> RespValue {
    RespValue::error(format!("ERR wrong number of arguments for '{}' command", cmd))
}
