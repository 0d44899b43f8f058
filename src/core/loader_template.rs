//! The Go dataloader template and its renderer.

use crate::error::{Error, Result};
use crate::params::LoaderParams;
use crate::template;

pub struct TemplateVars;

impl TemplateVars {
    pub const PACKAGE: &'static str = "package";
    pub const IMPORT: &'static str = "import";
    pub const LOADER_NAME: &'static str = "loader_name";
    pub const BATCH_NAME: &'static str = "batch_name";
    pub const NAME: &'static str = "name";
    pub const KEY_TYPE: &'static str = "key_type";
    pub const VALUE_TYPE: &'static str = "value_type";
    pub const PRIME_COPY: &'static str = "prime_copy";
}

/// Names the template binds wherever it spells out the value type.
/// An import alias equal to one of these would be shadowed or redeclared.
/// Predeclared identifiers are covered separately by `GO_PREDECLARED`.
pub const RESERVED_IDENTIFIERS: &[&str] = &[
    "sync", "time", "l", "key", "keys", "value", "it", "ok", "batch", "pos", "results", "found",
];

pub const LOADER_TEMPLATE: &str = r#"// Code generated by dataloaden, DO NOT EDIT.

package {{package}}

import (
	"sync"
	"time"
{{import}}
)

// {{loader_name}}Config captures the config to create a new {{loader_name}}
type {{loader_name}}Config struct {
	// Fetch is a method that provides the data for the loader
	Fetch func(keys []{{key_type}}) ([]{{value_type}}, []error)

	// Wait is how long to wait before sending a batch
	Wait time.Duration

	// MaxBatch will limit the maximum number of keys to send in one batch, 0 = no limit
	MaxBatch int
}

// New{{loader_name}} creates a new {{loader_name}} given a fetch, wait, and maxBatch
func New{{loader_name}}(config {{loader_name}}Config) *{{loader_name}} {
	return &{{loader_name}}{
		fetch:    config.Fetch,
		wait:     config.Wait,
		maxBatch: config.MaxBatch,
	}
}

// {{loader_name}} batches and caches requests
type {{loader_name}} struct {
	// this method provides the data for the loader
	fetch func(keys []{{key_type}}) ([]{{value_type}}, []error)

	// how long to wait before sending a batch
	wait time.Duration

	// this will limit the maximum number of keys to send in one batch, 0 = no limit
	maxBatch int

	// INTERNAL

	// lazily created cache
	cache map[{{key_type}}]{{value_type}}

	// the current batch. keys will continue to be collected until timeout is hit,
	// then everything will be sent to the fetch method and out to the listeners
	batch *{{batch_name}}

	// mutex to prevent races
	mu sync.Mutex
}

type {{batch_name}} struct {
	keys    []{{key_type}}
	data    []{{value_type}}
	error   []error
	closing bool
	done    chan struct{}
}

// Load a {{name}} by key, batching and caching will be applied automatically
func (l *{{loader_name}}) Load(key {{key_type}}) ({{value_type}}, error) {
	return l.LoadThunk(key)()
}

// LoadThunk returns a function that when called will block waiting for a {{name}}.
// This method should be used if you want one goroutine to make requests to many
// different data loaders without blocking until the thunk is called.
func (l *{{loader_name}}) LoadThunk(key {{key_type}}) func() ({{value_type}}, error) {
	l.mu.Lock()
	if it, ok := l.cache[key]; ok {
		l.mu.Unlock()
		return func() ({{value_type}}, error) {
			return it, nil
		}
	}
	if l.batch == nil {
		l.batch = &{{batch_name}}{done: make(chan struct{})}
	}
	batch := l.batch
	pos := batch.keyIndex(l, key)
	l.mu.Unlock()

	return func() ({{value_type}}, error) {
		<-batch.done

		var data {{value_type}}
		if pos < len(batch.data) {
			data = batch.data[pos]
		}

		var err error
		// its convenient to be able to return a single error for everything
		if len(batch.error) == 1 {
			err = batch.error[0]
		} else if batch.error != nil {
			err = batch.error[pos]
		}

		if err == nil {
			l.mu.Lock()
			l.unsafeSet(key, data)
			l.mu.Unlock()
		}

		return data, err
	}
}

// LoadAll fetches many keys at once. It will be broken into appropriate sized
// sub batches depending on how the loader is configured
func (l *{{loader_name}}) LoadAll(keys []{{key_type}}) ([]{{value_type}}, []error) {
	results := make([]func() ({{value_type}}, error), len(keys))

	for i, key := range keys {
		results[i] = l.LoadThunk(key)
	}

	{{name}}s := make([]{{value_type}}, len(keys))
	errors := make([]error, len(keys))
	for i, thunk := range results {
		{{name}}s[i], errors[i] = thunk()
	}
	return {{name}}s, errors
}

// LoadAllThunk returns a function that when called will block waiting for a {{name}}s.
// This method should be used if you want one goroutine to make requests to many
// different data loaders without blocking until the thunk is called.
func (l *{{loader_name}}) LoadAllThunk(keys []{{key_type}}) func() ([]{{value_type}}, []error) {
	results := make([]func() ({{value_type}}, error), len(keys))
	for i, key := range keys {
		results[i] = l.LoadThunk(key)
	}
	return func() ([]{{value_type}}, []error) {
		{{name}}s := make([]{{value_type}}, len(keys))
		errors := make([]error, len(keys))
		for i, thunk := range results {
			{{name}}s[i], errors[i] = thunk()
		}
		return {{name}}s, errors
	}
}

// Prime the cache with the provided key and value. If the key already exists, no change is made
// and false is returned.
// (To forcefully prime the cache, clear the key first with loader.Clear(key).Prime(key, value).)
func (l *{{loader_name}}) Prime(key {{key_type}}, value {{value_type}}) bool {
	l.mu.Lock()
	var found bool
	if _, found = l.cache[key]; !found {
		// make a copy when writing to the cache, its easy to pass a pointer in from a loop var
		// and end up with the whole cache pointing to the same value.
{{prime_copy}}
	}
	l.mu.Unlock()
	return !found
}

// Clear the value at key from the cache, if it exists
func (l *{{loader_name}}) Clear(key {{key_type}}) {
	l.mu.Lock()
	delete(l.cache, key)
	l.mu.Unlock()
}

func (l *{{loader_name}}) unsafeSet(key {{key_type}}, value {{value_type}}) {
	if l.cache == nil {
		l.cache = map[{{key_type}}]{{value_type}}{}
	}
	l.cache[key] = value
}

// keyIndex will return the location of the key in the batch, if its not found
// it will add the key to the batch
func (b *{{batch_name}}) keyIndex(l *{{loader_name}}, key {{key_type}}) int {
	for i, existingKey := range b.keys {
		if key == existingKey {
			return i
		}
	}

	pos := len(b.keys)
	b.keys = append(b.keys, key)
	if pos == 0 {
		go b.startTimer(l)
	}

	if l.maxBatch != 0 && pos >= l.maxBatch-1 {
		if !b.closing {
			b.closing = true
			l.batch = nil
			go b.end(l)
		}
	}

	return pos
}

func (b *{{batch_name}}) startTimer(l *{{loader_name}}) {
	time.Sleep(l.wait)
	l.mu.Lock()

	// we must have hit a batch limit and are already finalizing this batch
	if b.closing {
		l.mu.Unlock()
		return
	}

	l.batch = nil
	l.mu.Unlock()

	b.end(l)
}

func (b *{{batch_name}}) end(l *{{loader_name}}) {
	b.data, b.error = l.fetch(b.keys)
	close(b.done)
}
"#;

fn import_line(params: &LoaderParams) -> String {
    match &params.import {
        Some(path) => format!("\n\t\"{}\"", path),
        None => String::new(),
    }
}

fn prime_copy(params: &LoaderParams) -> String {
    if params.slice {
        format!(
            "\t\tcpy := make({}, len(value))\n\t\tcopy(cpy, value)\n\t\tl.unsafeSet(key, cpy)",
            params.value_type
        )
    } else {
        "\t\tcpy := *value\n\t\tl.unsafeSet(key, &cpy)".to_string()
    }
}

/// Render the loader source for `params` into `template_text`.
///
/// Fails when the template uses a placeholder the record does not provide.
pub fn render_with(template_text: &str, params: &LoaderParams) -> Result<String> {
    let import = import_line(params);
    let prime = prime_copy(params);
    let variables: [(&str, &str); 8] = [
        (TemplateVars::PACKAGE, params.package.as_str()),
        (TemplateVars::IMPORT, import.as_str()),
        (TemplateVars::LOADER_NAME, params.loader_name.as_str()),
        (TemplateVars::BATCH_NAME, params.batch_name.as_str()),
        (TemplateVars::NAME, params.name.as_str()),
        (TemplateVars::KEY_TYPE, params.key_type.as_str()),
        (TemplateVars::VALUE_TYPE, params.value_type.as_str()),
        (TemplateVars::PRIME_COPY, prime.as_str()),
    ];

    let unknown: Vec<String> = template::unresolved(template_text)
        .into_iter()
        .filter(|name| !variables.iter().any(|(key, _)| key == name))
        .collect();
    if !unknown.is_empty() {
        return Err(Error::render_failed(format!(
            "template references unknown placeholders: {}",
            unknown.join(", ")
        )));
    }

    Ok(template::render(template_text, &variables))
}

/// Render the built-in loader template.
pub fn render(params: &LoaderParams) -> Result<String> {
    render_with(LOADER_TEMPLATE, params)
}
