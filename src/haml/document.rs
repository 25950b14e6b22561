use anyhow::{anyhow, bail, Result};
use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

const INDENT: &str = "    ";
const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

impl Node {
    fn is_blank_text(&self) -> bool {
        matches!(self, Node::Text(text) if text.trim().is_empty())
    }
}

/// An element of the document tree.
///
/// `name` is the qualified name exactly as written in the source, while
/// `namespace` is the URI its prefix resolved to at parse time. Lookups
/// always go through the namespace so documents using a default namespace
/// and documents using an explicit prefix behave the same.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>, namespace: Option<String>) -> Self {
        Self {
            name: name.into(),
            namespace,
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        self.name
            .split_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(prefix, _)| prefix)
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn is(&self, namespace: &str, local: &str) -> bool {
        self.namespace() == Some(namespace) && self.local_name() == local
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.children
    }

    pub fn children<'a>(
        &'a self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter_map(move |node| match node {
            Node::Element(el) if el.is(namespace, local) => Some(el),
            _ => None,
        })
    }

    pub fn children_mut<'a>(
        &'a mut self,
        namespace: &'a str,
        local: &'a str,
    ) -> impl Iterator<Item = &'a mut Element> + 'a {
        self.children.iter_mut().filter_map(move |node| match node {
            Node::Element(el) if el.is(namespace, local) => Some(el),
            _ => None,
        })
    }

    pub fn child(&self, namespace: &str, local: &str) -> Option<&Element> {
        self.children.iter().find_map(|node| match node {
            Node::Element(el) if el.is(namespace, local) => Some(el),
            _ => None,
        })
    }

    pub fn child_mut(&mut self, namespace: &str, local: &str) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|node| match node {
            Node::Element(el) if el.is(namespace, local) => Some(el),
            _ => None,
        })
    }

    /// Leading character data, i.e. everything before the first child that
    /// is not text. `None` when the element starts with no text at all.
    pub fn text(&self) -> Option<String> {
        let mut leading = self
            .children
            .iter()
            .map_while(|node| match node {
                Node::Text(text) | Node::CData(text) => Some(text.as_str()),
                _ => None,
            })
            .peekable();
        leading.peek()?;
        Some(leading.collect())
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Creates a detached element in this element's namespace, written with
    /// the same prefix.
    pub fn create_element(&self, local: &str) -> Element {
        let name = match self.prefix() {
            Some(prefix) => format!("{prefix}:{local}"),
            None => local.to_string(),
        };
        Element::new(name, self.namespace.clone())
    }

    pub fn append_child(&mut self, element: Element) {
        self.children.push(Node::Element(element));
    }

    /// Returns the first child named `local` in this element's namespace,
    /// appending a new empty one when there is none.
    pub fn ensure_child(&mut self, local: &str) -> &mut Element {
        let existing = self.children.iter().position(|node| {
            matches!(node, Node::Element(el) if el.namespace == self.namespace && el.local_name() == local)
        });
        let index = match existing {
            Some(index) => index,
            None => {
                let element = self.create_element(local);
                self.append_child(element);
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            Node::Element(el) => el,
            _ => unreachable!("position only matches element nodes"),
        }
    }

    /// Detaches every child element with the given name, returning how many
    /// were removed.
    pub fn remove_children(&mut self, namespace: &str, local: &str) -> usize {
        let before = self.children.len();
        self.children
            .retain(|node| !matches!(node, Node::Element(el) if el.is(namespace, local)));
        before - self.children.len()
    }

    /// Element children with only whitespace between them get re-indented on
    /// output; anything carrying real text is written as found.
    fn is_layout_only(&self) -> bool {
        let mut has_element = false;
        for node in &self.children {
            match node {
                Node::Element(_) => has_element = true,
                Node::Text(text) if !text.trim().is_empty() => return false,
                Node::CData(_) => return false,
                _ => {}
            }
        }
        has_element
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    prolog: Vec<Node>,
    root: Element,
    epilog: Vec<Node>,
}

impl Document {
    pub fn root(&self) -> &Element {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut Element {
        &mut self.root
    }

    pub fn parse_str(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        let mut builder = TreeBuilder::default();

        loop {
            let event = reader
                .read_event()
                .map_err(|e| anyhow!("malformed XML at byte {}: {}", reader.buffer_position(), e))?;

            match event {
                Event::Start(start) => {
                    let element = builder.open(&start)?;
                    builder.open_elements.push(element);
                }
                Event::Empty(start) => {
                    let element = builder.open(&start)?;
                    builder.close(element)?;
                }
                Event::End(_) => {
                    let element = builder
                        .open_elements
                        .pop()
                        .ok_or_else(|| anyhow!("closing tag without a matching opening tag"))?;
                    builder.close(element)?;
                }
                Event::Text(text) => {
                    let text = text.unescape()?.into_owned();
                    builder.character_data(Node::Text(text))?;
                }
                Event::CData(cdata) => {
                    let text = String::from_utf8(cdata.into_inner().into_owned())?;
                    builder.character_data(Node::CData(text))?;
                }
                Event::Comment(comment) => {
                    let text = std::str::from_utf8(&comment)?.to_string();
                    builder.misc(Node::Comment(text));
                }
                Event::PI(pi) => {
                    let text = std::str::from_utf8(&pi)?.to_string();
                    builder.misc(Node::ProcessingInstruction(text));
                }
                Event::DocType(doctype) => {
                    let text = std::str::from_utf8(&doctype)?.trim_start().to_string();
                    builder.misc(Node::DocType(text));
                }
                // Always replaced by our own declaration on output.
                Event::Decl(_) => {}
                Event::Eof => break,
            }
        }

        builder.finish()
    }

    /// Serializes the whole document behind a fresh XML declaration.
    pub fn to_xml_string(&self) -> Result<String> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        for node in &self.prolog {
            write_indent(&mut writer, 0)?;
            write_node(&mut writer, node, 0)?;
        }
        write_indent(&mut writer, 0)?;
        write_element(&mut writer, &self.root, 0)?;
        for node in &self.epilog {
            write_indent(&mut writer, 0)?;
            write_node(&mut writer, node, 0)?;
        }
        write_indent(&mut writer, 0)?;

        Ok(String::from_utf8(writer.into_inner())?)
    }
}

#[derive(Default)]
struct TreeBuilder {
    /// One frame per open element: (prefix, uri) pairs it declared. The
    /// empty prefix is the default namespace; `None` undeclares it.
    scopes: Vec<Vec<(String, Option<String>)>>,
    open_elements: Vec<Element>,
    prolog: Vec<Node>,
    root: Option<Element>,
    epilog: Vec<Node>,
}

impl TreeBuilder {
    fn open(&mut self, start: &BytesStart) -> Result<Element> {
        let name = std::str::from_utf8(start.name().as_ref())?.to_string();

        let mut attributes = Vec::new();
        let mut bindings = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            let key = std::str::from_utf8(attr.key.as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            if key == "xmlns" {
                bindings.push((String::new(), (!value.is_empty()).then(|| value.clone())));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                bindings.push((prefix.to_string(), Some(value.clone())));
            }
            attributes.push((key, value));
        }
        self.scopes.push(bindings);

        let prefix = name.split_once(':').map_or("", |(prefix, _)| prefix);
        let namespace = self.resolve(prefix);

        Ok(Element {
            name,
            namespace,
            attributes,
            children: Vec::new(),
        })
    }

    fn resolve(&self, prefix: &str) -> Option<String> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE.to_string());
        }
        self.scopes
            .iter()
            .rev()
            .flat_map(|frame| frame.iter())
            .find(|(bound, _)| bound == prefix)
            .and_then(|(_, uri)| uri.clone())
    }

    fn close(&mut self, element: Element) -> Result<()> {
        self.scopes.pop();
        match self.open_elements.last_mut() {
            Some(parent) => parent.children.push(Node::Element(element)),
            None if self.root.is_none() => self.root = Some(element),
            None => bail!("document has more than one root element"),
        }
        Ok(())
    }

    fn character_data(&mut self, node: Node) -> Result<()> {
        match self.open_elements.last_mut() {
            Some(parent) => parent.children.push(node),
            None if node.is_blank_text() => {}
            None => bail!("character data outside of the root element"),
        }
        Ok(())
    }

    fn misc(&mut self, node: Node) {
        if let Some(parent) = self.open_elements.last_mut() {
            parent.children.push(node);
        } else if self.root.is_none() {
            self.prolog.push(node);
        } else {
            self.epilog.push(node);
        }
    }

    fn finish(self) -> Result<Document> {
        if let Some(unclosed) = self.open_elements.last() {
            bail!("element <{}> is never closed", unclosed.name);
        }
        let root = self
            .root
            .ok_or_else(|| anyhow!("document has no root element"))?;
        Ok(Document {
            prolog: self.prolog,
            root,
            epilog: self.epilog,
        })
    }
}

fn write_indent(writer: &mut Writer<Vec<u8>>, level: usize) -> Result<()> {
    let indent = format!("\n{}", INDENT.repeat(level));
    writer.write_event(Event::Text(BytesText::from_escaped(indent)))?;
    Ok(())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node, level: usize) -> Result<()> {
    match node {
        Node::Element(element) => return write_element(writer, element, level),
        Node::Text(text) => {
            writer.write_event(Event::Text(BytesText::from_escaped(partial_escape(text.as_str()))))?
        }
        Node::CData(text) => writer.write_event(Event::CData(BytesCData::new(text.as_str())))?,
        Node::Comment(text) => {
            writer.write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?
        }
        Node::ProcessingInstruction(text) => {
            writer.write_event(Event::PI(BytesText::from_escaped(text.as_str())))?
        }
        Node::DocType(text) => {
            writer.write_event(Event::DocType(BytesText::from_escaped(text.as_str())))?
        }
    }
    Ok(())
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element, level: usize) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        writer.write_event(Event::Empty(start))?;
        return Ok(());
    }

    writer.write_event(Event::Start(start))?;
    if element.is_layout_only() {
        for node in element.children.iter().filter(|node| !node.is_blank_text()) {
            write_indent(writer, level + 1)?;
            write_node(writer, node, level + 1)?;
        }
        write_indent(writer, level)?;
    } else {
        for node in &element.children {
            write_node(writer, node, level + 1)?;
        }
    }
    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "urn:example";

    #[test]
    fn test_resolves_default_and_prefixed_namespaces() {
        let doc = Document::parse_str(
            r#"<root xmlns="urn:example" xmlns:o="urn:other"><a/><o:b/><c xmlns=""/></root>"#,
        )
        .unwrap();
        let root = doc.root();
        assert!(root.is(NS, "root"));
        assert!(root.child(NS, "a").is_some());
        assert!(root.child(NS, "b").is_none());
        assert!(root.child("urn:other", "b").is_some());
        assert!(root.child(NS, "c").is_none());
    }

    #[test]
    fn test_created_elements_share_prefix() {
        let doc = Document::parse_str(r#"<h:root xmlns:h="urn:example"/>"#).unwrap();
        let child = doc.root().create_element("leaf");
        assert_eq!(child.name(), "h:leaf");
        assert!(child.is(NS, "leaf"));
    }

    #[test]
    fn test_text_reads_leading_character_data() {
        let doc = Document::parse_str(
            r#"<r xmlns="urn:example"><a>12&amp;3</a><b/><c><![CDATA[x]]>y<d/>z</c></r>"#,
        )
        .unwrap();
        let root = doc.root();
        assert_eq!(root.child(NS, "a").unwrap().text().as_deref(), Some("12&3"));
        assert_eq!(root.child(NS, "b").unwrap().text(), None);
        assert_eq!(root.child(NS, "c").unwrap().text().as_deref(), Some("xy"));
    }

    #[test]
    fn test_ensure_and_remove_children() {
        let mut doc = Document::parse_str(r#"<r xmlns="urn:example"><x>1</x><x>2</x></r>"#).unwrap();
        let root = doc.root_mut();

        root.ensure_child("y").append_child(Element::new("z", None));
        root.ensure_child("y");
        assert_eq!(root.children(NS, "y").count(), 1);
        assert_eq!(root.ensure_child("x").text().as_deref(), Some("1"));

        assert_eq!(root.remove_children(NS, "x"), 2);
        assert!(root.child(NS, "x").is_none());
    }

    #[test]
    fn test_serializes_with_four_space_indent() {
        let doc = Document::parse_str(
            "<?xml version='1.0'?>\n<!-- head -->\n<r xmlns=\"urn:example\" id=\"1\">  <a>t</a><b/><m>x<i/>y</m></r>",
        )
        .unwrap();
        let xml = doc.to_xml_string().unwrap();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<!-- head -->\n\
             <r xmlns=\"urn:example\" id=\"1\">\n    <a>t</a>\n    <b/>\n    <m>x<i/>y</m>\n</r>\n"
        );
    }

    #[test]
    fn test_reparsing_output_is_stable() {
        let source = r#"<r xmlns="urn:example"><a k="&lt;v&gt;">1 &lt; 2</a><b><c/></b></r>"#;
        let first = Document::parse_str(source).unwrap().to_xml_string().unwrap();
        let second = Document::parse_str(&first).unwrap().to_xml_string().unwrap();
        assert_eq!(first, second);
        assert!(first.contains("<a k=\"&lt;v&gt;\">1 &lt; 2</a>"));

        let doc = Document::parse_str(&second).unwrap();
        let a = doc.root().child(NS, "a").unwrap();
        assert_eq!(a.attribute("k"), Some("<v>"));
        assert_eq!(a.text().as_deref(), Some("1 < 2"));
    }

    #[test]
    fn test_rejects_malformed_documents() {
        assert!(Document::parse_str("<r><a></r>").is_err());
        assert!(Document::parse_str("<r/><s/>").is_err());
        assert!(Document::parse_str("   ").is_err());
    }
}
