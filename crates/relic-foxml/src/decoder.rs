//! The FOXML state machine.
//!
//! The document is consumed as a pull stream of XML events. Each nesting
//! level of the format (document, object, properties, datastream, version,
//! content) is read by its own method, so the call stack is the parser
//! state and nothing above the current version is buffered.

use std::collections::HashSet;
use std::fmt;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Reader;
use relic_content::{
    substitute_local_server, ContentAccessor, FileContent, InternalIdResolver, MemoryContent,
    UrlContent, UrlFetcher,
};
use relic_types::{
    vocab, ContentDigest, ControlGroup, DatastreamInfo, DatastreamState, ObjectInfo,
    ObjectProperties, ObjectProperty,
};
use tracing::{debug, trace, warn};

use crate::attrs::ElementAttrs;
use crate::binary::{Base64Sink, ScratchSpace};
use crate::error::{FoxmlError, FoxmlResult};
use crate::handler::ObjectHandler;
use crate::inline::serialize_fragment;
use crate::scope::NamespaceScope;
use crate::version::DatastreamVersion;

/// `VERSION` attribute value of current serializations; anything else is
/// read as the legacy 1.0 dialect.
const CURRENT_FORMAT_VERSION: &str = "1.1";

/// Settings shared by every decoder built from one [`DecoderContext`].
#[derive(Clone, Debug)]
pub struct DecoderConfig {
    /// Host substituted for the local-server token in content URLs.
    pub local_fedora_server: String,
    /// Parent directory for decoded binary content. System default if unset.
    pub temp_dir: Option<PathBuf>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            local_fedora_server: "localhost:8080".into(),
            temp_dir: None,
        }
    }
}

/// Builds decoders that share a resolver, a fetcher and configuration.
#[derive(Clone)]
pub struct DecoderContext {
    resolver: Arc<dyn InternalIdResolver>,
    fetcher: Arc<dyn UrlFetcher>,
    config: DecoderConfig,
}

impl DecoderContext {
    pub fn new(
        resolver: Arc<dyn InternalIdResolver>,
        fetcher: Arc<dyn UrlFetcher>,
        config: DecoderConfig,
    ) -> Self {
        Self {
            resolver,
            fetcher,
            config,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// A decoder for one serialized object.
    pub fn decoder<R: BufRead>(&self, input: R) -> FoxmlDecoder<R> {
        FoxmlDecoder {
            reader: Reader::from_reader(input),
            resolver: Arc::clone(&self.resolver),
            fetcher: Arc::clone(&self.fetcher),
            local_server: self.config.local_fedora_server.clone(),
            scratch: ScratchSpace::new(self.config.temp_dir.clone()),
            namespaces: NamespaceScope::default(),
        }
    }
}

impl fmt::Debug for DecoderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoderContext")
            .field("resolver", &self.resolver)
            .field("config", &self.config)
            .finish()
    }
}

/// Identity and dialect read from the root element.
struct RootElement {
    object: Arc<ObjectInfo>,
    name: Vec<u8>,
    legacy: bool,
    empty: bool,
}

/// Single-pass decoder for one FOXML document.
///
/// Owns every temporary file it creates; they are removed when decoding
/// finishes or when the decoder is dropped.
pub struct FoxmlDecoder<R: BufRead> {
    reader: Reader<R>,
    resolver: Arc<dyn InternalIdResolver>,
    fetcher: Arc<dyn UrlFetcher>,
    local_server: String,
    scratch: ScratchSpace,
    namespaces: NamespaceScope,
}

impl<R: BufRead> FoxmlDecoder<R> {
    /// Decode the document, reporting to `handler`.
    ///
    /// On success `complete` has been called and the object's identity is
    /// returned. On failure after the root element was read, `abort` has
    /// been called. Temporary content is gone once this returns.
    pub fn decode<H: ObjectHandler>(mut self, handler: &mut H) -> Result<Arc<ObjectInfo>, H::Error> {
        let root = self.read_root()?;
        let object = Arc::clone(&root.object);
        debug!(pid = object.pid(), legacy = root.legacy, "decoding object");

        handler.begin(&object)?;
        match self.read_object(&root, handler) {
            Ok(()) => {
                let result = handler.complete(&object);
                self.scratch.release();
                result?;
                Ok(object)
            }
            Err(e) => {
                warn!(pid = object.pid(), "object decoding failed");
                handler.abort(&object);
                self.scratch.release();
                Err(e)
            }
        }
    }

    fn position(&self) -> u64 {
        self.reader.buffer_position() as u64
    }

    fn next_event<'b>(&mut self, buf: &'b mut Vec<u8>) -> FoxmlResult<Event<'b>> {
        buf.clear();
        let position = self.position();
        self.reader
            .read_event_into(buf)
            .map_err(|e| FoxmlError::Xml {
                position,
                message: e.to_string(),
            })
    }

    fn attrs(&self, start: &BytesStart<'_>) -> FoxmlResult<ElementAttrs> {
        ElementAttrs::parse(start, self.position())
    }

    fn unexpected_element(&self, start: &BytesStart<'_>, context: &'static str) -> FoxmlError {
        FoxmlError::UnexpectedElement {
            element: String::from_utf8_lossy(start.name().as_ref()).into_owned(),
            context,
            position: self.position(),
        }
    }

    /// Whitespace is always allowed between elements; anything else is not.
    fn check_text(&self, text: &BytesText<'_>, context: &'static str) -> FoxmlResult<()> {
        if is_whitespace(text) {
            Ok(())
        } else {
            Err(FoxmlError::UnexpectedText {
                context,
                position: self.position(),
            })
        }
    }

    fn truncated(&self, context: &str) -> FoxmlError {
        FoxmlError::Malformed(format!(
            "document ended inside {context} at byte {}",
            self.position()
        ))
    }

    // ---------------------------------------------------------------
    // Document and object level
    // ---------------------------------------------------------------

    fn read_root(&mut self) -> FoxmlResult<RootElement> {
        let mut buf = Vec::new();
        loop {
            let (start, empty) = match self.next_event(&mut buf)? {
                Event::Decl(_) | Event::Comment(_) | Event::PI(_) | Event::DocType(_) => continue,
                Event::Text(text) => {
                    self.check_text(&text, "document prolog")?;
                    continue;
                }
                Event::Start(start) => (start, false),
                Event::Empty(start) => (start, true),
                Event::Eof => {
                    return Err(FoxmlError::Malformed("document has no root element".into()))
                }
                Event::CData(_) => {
                    return Err(FoxmlError::UnexpectedText {
                        context: "document prolog",
                        position: self.position(),
                    })
                }
                Event::End(_) => {
                    return Err(FoxmlError::Malformed("unbalanced end tag before root".into()))
                }
            };
            if start.local_name().as_ref() != b"digitalObject" {
                return Err(self.unexpected_element(&start, "document"));
            }
            let attrs = self.attrs(&start)?;
            let pid = attrs.required("PID")?.trim().to_string();
            let uri = attrs.non_empty("FEDORA_URI").map(str::to_string);
            let legacy = attrs.get("VERSION").map(str::trim) != Some(CURRENT_FORMAT_VERSION);
            if !empty {
                self.namespaces.push(attrs.namespaces());
            }
            return Ok(RootElement {
                object: Arc::new(ObjectInfo::new(pid, uri)),
                name: start.name().as_ref().to_vec(),
                legacy,
                empty,
            });
        }
    }

    fn read_object<H: ObjectHandler>(
        &mut self,
        root: &RootElement,
        handler: &mut H,
    ) -> Result<(), H::Error> {
        let object = root.object.as_ref();
        if !handler.wants_body(object) {
            debug!(pid = object.pid(), "skipping object body");
            return Ok(self.skip_object(root)?);
        }
        if root.empty {
            handler.properties(object, ObjectProperties::new())?;
            return Ok(self.read_epilog()?);
        }

        let mut properties_seen = false;
        let mut versions_seen: HashSet<(String, String)> = HashSet::new();
        let mut buf = Vec::new();
        loop {
            match self.next_event(&mut buf)? {
                Event::Start(start) => match start.local_name().as_ref() {
                    b"objectProperties" => {
                        if properties_seen {
                            return Err(FoxmlError::Malformed(
                                "objectProperties appears more than once or after datastreams"
                                    .into(),
                            )
                            .into());
                        }
                        let properties = self.read_properties(root.legacy)?;
                        handler.properties(object, properties)?;
                        properties_seen = true;
                    }
                    b"datastream" => {
                        let attrs = self.attrs(&start)?;
                        if !properties_seen {
                            handler.properties(object, ObjectProperties::new())?;
                            properties_seen = true;
                        }
                        self.namespaces.push(attrs.namespaces());
                        self.read_datastream(root, &attrs, &mut versions_seen, handler)?;
                        self.namespaces.pop();
                    }
                    b"disseminator" if root.legacy => {
                        let attrs = self.attrs(&start)?;
                        let mut skipped = Vec::new();
                        self.reader
                            .read_to_end_into(start.name(), &mut skipped)
                            .map_err(|e| FoxmlError::Xml {
                                position: self.position(),
                                message: e.to_string(),
                            })?;
                        trace!(pid = object.pid(), id = ?attrs.get("ID"), "skipped disseminator");
                        handler.disseminator(object, attrs.non_empty("ID"))?;
                    }
                    _ => return Err(self.unexpected_element(&start, "digitalObject").into()),
                },
                Event::Empty(start) => match start.local_name().as_ref() {
                    b"objectProperties" if !properties_seen => {
                        handler.properties(object, ObjectProperties::new())?;
                        properties_seen = true;
                    }
                    b"datastream" => {
                        let attrs = self.attrs(&start)?;
                        if !properties_seen {
                            handler.properties(object, ObjectProperties::new())?;
                            properties_seen = true;
                        }
                        let id = attrs.required("ID")?;
                        debug!(pid = object.pid(), datastream = id, "datastream has no versions");
                    }
                    b"disseminator" if root.legacy => {
                        let attrs = self.attrs(&start)?;
                        handler.disseminator(object, attrs.non_empty("ID"))?;
                    }
                    _ => return Err(self.unexpected_element(&start, "digitalObject").into()),
                },
                Event::End(_) => break,
                Event::Text(text) => self.check_text(&text, "digitalObject")?,
                Event::Comment(_) | Event::PI(_) => {}
                Event::CData(_) => {
                    return Err(FoxmlError::UnexpectedText {
                        context: "digitalObject",
                        position: self.position(),
                    }
                    .into())
                }
                Event::Decl(_) | Event::DocType(_) => {
                    return Err(FoxmlError::Malformed(
                        "declaration inside digitalObject".into(),
                    )
                    .into())
                }
                Event::Eof => return Err(self.truncated("digitalObject").into()),
            }
        }
        self.namespaces.pop();
        if !properties_seen {
            handler.properties(object, ObjectProperties::new())?;
        }
        Ok(self.read_epilog()?)
    }

    /// Consume the rest of the root element without interpreting it.
    fn skip_object(&mut self, root: &RootElement) -> FoxmlResult<()> {
        if !root.empty {
            let position = self.position();
            let mut skipped = Vec::new();
            self.reader
                .read_to_end_into(QName(&root.name), &mut skipped)
                .map_err(|e| FoxmlError::Xml {
                    position,
                    message: e.to_string(),
                })?;
            self.namespaces.pop();
        }
        self.read_epilog()
    }

    /// Only comments, processing instructions and whitespace may follow the
    /// root element.
    fn read_epilog(&mut self) -> FoxmlResult<()> {
        let mut buf = Vec::new();
        loop {
            match self.next_event(&mut buf)? {
                Event::Eof => return Ok(()),
                Event::Comment(_) | Event::PI(_) => {}
                Event::Text(text) => self.check_text(&text, "document epilog")?,
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.unexpected_element(&start, "document epilog"))
                }
                _ => {
                    return Err(FoxmlError::Malformed(
                        "unexpected content after root element".into(),
                    ))
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Object properties
    // ---------------------------------------------------------------

    fn read_properties(&mut self, legacy: bool) -> FoxmlResult<ObjectProperties> {
        let mut properties = ObjectProperties::new();
        let mut buf = Vec::new();
        loop {
            match self.next_event(&mut buf)? {
                Event::Start(start) | Event::Empty(start)
                    if !matches!(start.local_name().as_ref(), b"property" | b"extproperty") =>
                {
                    return Err(self.unexpected_element(&start, "objectProperties"))
                }
                Event::Empty(start) => {
                    let attrs = self.attrs(&start)?;
                    properties.push(property_from(&attrs, legacy)?);
                }
                Event::Start(start) => {
                    let attrs = self.attrs(&start)?;
                    properties.push(property_from(&attrs, legacy)?);
                    self.read_empty_body("property")?;
                }
                Event::End(_) => return Ok(properties),
                Event::Text(text) => self.check_text(&text, "objectProperties")?,
                Event::Comment(_) | Event::PI(_) => {}
                Event::Eof => return Err(self.truncated("objectProperties")),
                _ => {
                    return Err(FoxmlError::Malformed(
                        "unexpected content in objectProperties".into(),
                    ))
                }
            }
        }
    }

    /// Consume up to the end tag of an element that must not have content.
    fn read_empty_body(&mut self, context: &'static str) -> FoxmlResult<()> {
        let mut buf = Vec::new();
        loop {
            match self.next_event(&mut buf)? {
                Event::End(_) => return Ok(()),
                Event::Text(text) => self.check_text(&text, context)?,
                Event::Comment(_) | Event::PI(_) => {}
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.unexpected_element(&start, context))
                }
                Event::Eof => return Err(self.truncated(context)),
                _ => {
                    return Err(FoxmlError::UnexpectedText {
                        context,
                        position: self.position(),
                    })
                }
            }
        }
    }

    // ---------------------------------------------------------------
    // Datastreams and versions
    // ---------------------------------------------------------------

    fn read_datastream<H: ObjectHandler>(
        &mut self,
        root: &RootElement,
        attrs: &ElementAttrs,
        versions_seen: &mut HashSet<(String, String)>,
        handler: &mut H,
    ) -> Result<(), H::Error> {
        let datastream = Arc::new(datastream_from(&root.object, attrs)?);
        trace!(
            pid = root.object.pid(),
            datastream = datastream.id(),
            control_group = %datastream.control_group(),
            "datastream"
        );

        let mut buf = Vec::new();
        loop {
            match self.next_event(&mut buf)? {
                Event::Start(start) if start.local_name().as_ref() == b"datastreamVersion" => {
                    let version_attrs = self.attrs(&start)?;
                    let version_id = version_attrs.required("ID")?.to_string();
                    if !versions_seen.insert((datastream.id().to_string(), version_id.clone())) {
                        return Err(FoxmlError::DuplicateVersion {
                            datastream: datastream.id().to_string(),
                            version: version_id,
                        }
                        .into());
                    }
                    self.namespaces.push(version_attrs.namespaces());
                    let version = self.read_version(&datastream, &version_attrs)?;
                    self.namespaces.pop();
                    handler.datastream_version(version)?;
                }
                Event::Empty(start) if start.local_name().as_ref() == b"datastreamVersion" => {
                    let version_attrs = self.attrs(&start)?;
                    return Err(FoxmlError::Malformed(format!(
                        "version {} of datastream {} has no content",
                        version_attrs.get("ID").unwrap_or("?"),
                        datastream.id()
                    ))
                    .into());
                }
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.unexpected_element(&start, "datastream").into())
                }
                Event::End(_) => return Ok(()),
                Event::Text(text) => self.check_text(&text, "datastream")?,
                Event::Comment(_) | Event::PI(_) => {}
                Event::Eof => return Err(self.truncated("datastream").into()),
                _ => {
                    return Err(FoxmlError::UnexpectedText {
                        context: "datastream",
                        position: self.position(),
                    }
                    .into())
                }
            }
        }
    }

    fn read_version(
        &mut self,
        datastream: &Arc<DatastreamInfo>,
        attrs: &ElementAttrs,
    ) -> FoxmlResult<DatastreamVersion> {
        let id = attrs.required("ID")?.to_string();
        let created = attrs.required("CREATED")?.trim().to_string();
        let size = match attrs.non_empty("SIZE") {
            Some(raw) => {
                let size: i64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| attrs.invalid("SIZE", raw, "not an integer"))?;
                u64::try_from(size).ok().filter(|s| *s > 0)
            }
            None => None,
        };

        let mut digest: Option<ContentDigest> = None;
        let mut content: Option<Box<dyn ContentAccessor>> = None;
        let mut external_url: Option<String> = None;
        let mut buf = Vec::new();
        loop {
            let (start, empty) = match self.next_event(&mut buf)? {
                Event::Start(start) => (start, false),
                Event::Empty(start) => (start, true),
                Event::End(_) => break,
                Event::Text(text) => {
                    self.check_text(&text, "datastreamVersion")?;
                    continue;
                }
                Event::Comment(_) | Event::PI(_) => continue,
                Event::Eof => return Err(self.truncated("datastreamVersion")),
                _ => {
                    return Err(FoxmlError::UnexpectedText {
                        context: "datastreamVersion",
                        position: self.position(),
                    })
                }
            };
            let name = start.local_name().as_ref().to_vec();
            if name.as_slice() != b"contentDigest" && content.is_some() {
                return Err(FoxmlError::Malformed(format!(
                    "version {id} of datastream {} has more than one content element",
                    datastream.id()
                )));
            }
            match name.as_slice() {
                b"contentDigest" => {
                    let child = self.attrs(&start)?;
                    if !empty {
                        self.read_empty_body("contentDigest")?;
                    }
                    let declared = ContentDigest::new(
                        child.get("TYPE").unwrap_or_default().trim(),
                        child.get("DIGEST").unwrap_or_default().trim(),
                    );
                    if !declared.is_disabled() {
                        digest = Some(declared);
                    }
                }
                b"xmlContent" => {
                    let child = self.attrs(&start)?;
                    let bytes = if empty {
                        Vec::new()
                    } else {
                        self.namespaces.push(child.namespaces());
                        let bytes = self.read_inline_xml();
                        self.namespaces.pop();
                        bytes?
                    };
                    content = Some(Box::new(MemoryContent::new(bytes)));
                }
                b"contentLocation" => {
                    let child = self.attrs(&start)?;
                    if !empty {
                        self.read_empty_body("contentLocation")?;
                    }
                    let (accessor, url) = self.resolve_location(&child)?;
                    external_url = url;
                    content = Some(accessor);
                }
                b"binaryContent" => {
                    let accessor: Box<dyn ContentAccessor> = if empty {
                        Box::new(MemoryContent::new(Vec::new()))
                    } else {
                        Box::new(self.read_binary()?)
                    };
                    content = Some(accessor);
                }
                _ => return Err(self.unexpected_element(&start, "datastreamVersion")),
            }
        }

        let content = content.ok_or_else(|| {
            FoxmlError::Malformed(format!(
                "version {id} of datastream {} has no content",
                datastream.id()
            ))
        })?;

        let mut version = DatastreamVersion::new(Arc::clone(datastream), id, created, content)
            .with_label(attrs.get("LABEL").unwrap_or_default())
            .with_mime_type(attrs.get("MIMETYPE").unwrap_or_default().trim())
            .with_alt_ids(
                attrs
                    .get("ALT_IDS")
                    .unwrap_or_default()
                    .split_whitespace()
                    .map(str::to_string)
                    .collect(),
            );
        if let Some(format_uri) = attrs.non_empty("FORMAT_URI") {
            version = version.with_format_uri(format_uri.trim());
        }
        if let Some(size) = size {
            version = version.with_size(size);
        }
        if let Some(digest) = digest {
            version = version.with_digest(digest);
        }
        if let Some(url) = external_url {
            version = version.with_external_url(url);
        }
        trace!(
            datastream = datastream.id(),
            version = version.id(),
            content = %version.content().describe(),
            "datastream version"
        );
        Ok(version)
    }

    // ---------------------------------------------------------------
    // Content representations
    // ---------------------------------------------------------------

    /// Capture the children of `xmlContent` and serialize them standalone.
    fn read_inline_xml(&mut self) -> FoxmlResult<Vec<u8>> {
        let inherited = self.namespaces.bindings();
        let mut events: Vec<Event<'static>> = Vec::new();
        let mut depth = 0usize;
        let mut buf = Vec::new();
        loop {
            let event = self.next_event(&mut buf)?;
            match &event {
                Event::Start(_) => depth += 1,
                Event::End(_) if depth == 0 => break,
                Event::End(_) => depth -= 1,
                Event::Text(text) if depth == 0 => {
                    self.check_text(text, "xmlContent")?;
                    continue;
                }
                Event::Eof => return Err(self.truncated("xmlContent")),
                Event::Decl(_) | Event::DocType(_) => {
                    return Err(FoxmlError::Malformed(
                        "declaration inside inline XML content".into(),
                    ))
                }
                _ => {}
            }
            events.push(event.into_owned());
        }
        serialize_fragment(events, &inherited)
    }

    fn resolve_location(
        &self,
        attrs: &ElementAttrs,
    ) -> FoxmlResult<(Box<dyn ContentAccessor>, Option<String>)> {
        let kind = attrs.required("TYPE")?.trim();
        let reference = attrs.required("REF")?.trim();
        match kind {
            "INTERNAL_ID" => Ok((self.resolver.resolve(reference)?, None)),
            "URL" => {
                let url = substitute_local_server(reference, &self.local_server);
                let accessor = UrlContent::new(url.clone(), Arc::clone(&self.fetcher));
                Ok((Box::new(accessor), Some(url)))
            }
            other => Err(attrs.invalid("TYPE", other, "expected INTERNAL_ID or URL")),
        }
    }

    /// Stream base64 character data into a decoder-owned temporary file.
    fn read_binary(&mut self) -> FoxmlResult<FileContent> {
        let (path, file) = self.scratch.create_file()?;
        let mut sink = Base64Sink::new(file);
        let mut buf = Vec::new();
        loop {
            match self.next_event(&mut buf)? {
                Event::Text(text) => sink.push(&text)?,
                Event::CData(data) => sink.push(&data)?,
                Event::Comment(_) | Event::PI(_) => {}
                Event::End(_) => break,
                Event::Start(start) | Event::Empty(start) => {
                    return Err(self.unexpected_element(&start, "binaryContent"))
                }
                Event::Eof => return Err(self.truncated("binaryContent")),
                _ => {
                    return Err(FoxmlError::Malformed(
                        "unexpected content in binaryContent".into(),
                    ))
                }
            }
        }
        let size = sink.finish()?;
        trace!(path = %path.display(), size, "decoded binary content");
        Ok(FileContent::temporary(path))
    }
}

impl<R: BufRead> fmt::Debug for FoxmlDecoder<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FoxmlDecoder")
            .field("local_server", &self.local_server)
            .field("scratch", &self.scratch.path())
            .finish()
    }
}

fn is_whitespace(text: &[u8]) -> bool {
    text.iter().all(u8::is_ascii_whitespace)
}

fn property_from(attrs: &ElementAttrs, legacy: bool) -> FoxmlResult<ObjectProperty> {
    let name = attrs.required("NAME")?.trim();
    let value = attrs.get("VALUE").unwrap_or_default();
    let name = if legacy && name == vocab::RDF_TYPE {
        vocab::DC_TYPE
    } else {
        name
    };
    Ok(ObjectProperty::new(name, value))
}

fn datastream_from(object: &Arc<ObjectInfo>, attrs: &ElementAttrs) -> FoxmlResult<DatastreamInfo> {
    let id = attrs.required("ID")?.trim();
    let group_code = attrs.required("CONTROL_GROUP")?.trim();
    let control_group = ControlGroup::from_code(group_code)
        .map_err(|e| FoxmlError::invalid_value(attrs.element(), "CONTROL_GROUP", group_code, e))?;
    let state = match attrs.non_empty("STATE") {
        Some(code) => DatastreamState::from_code(code.trim())
            .map_err(|e| FoxmlError::invalid_value(attrs.element(), "STATE", code, e))?,
        None => DatastreamState::default(),
    };
    let versionable = match attrs.non_empty("VERSIONABLE").map(str::trim) {
        None | Some("true") => true,
        Some("false") => false,
        Some(other) => return Err(attrs.invalid("VERSIONABLE", other, "expected true or false")),
    };
    let info = DatastreamInfo::new(Arc::clone(object), id, control_group, state, versionable);
    Ok(match attrs.non_empty("FEDORA_URI") {
        Some(uri) => info.with_uri(uri.trim()),
        None => info,
    })
}
