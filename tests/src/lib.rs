//! Cross-crate tests: enumeration feeding the engine, stub probes, and the
//! TCP probe against real loopback listeners.

#[cfg(test)]
mod engine;
#[cfg(test)]
mod support;
#[cfg(test)]
mod tcp;
