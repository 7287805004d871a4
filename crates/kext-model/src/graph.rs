use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use kext_classpath::ByteSource;

use crate::markers::Markers;
use crate::node::TypeNode;
use crate::param_names::{NoParameterNames, ParameterNames};
use crate::ModelError;

pub struct GraphOptions {
    pub markers: Markers,
    pub parameter_names: Box<dyn ParameterNames>,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            markers: Markers::default(),
            parameter_names: Box::new(NoParameterNames),
        }
    }
}

impl fmt::Debug for GraphOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphOptions")
            .field("markers", &self.markers)
            .finish_non_exhaustive()
    }
}

/// Lazily built, memoized view over every type a [`ByteSource`] provides.
///
/// Nodes are created on first lookup and cached by source name for the
/// graph's lifetime, so looking the same name up twice yields the same
/// [`Rc`]. Nodes hold a weak link back to the graph; once the graph is
/// closed every navigation on them fails with [`ModelError::Closed`].
pub struct TypeGraph {
    inner: Rc<GraphInner>,
}

pub(crate) struct GraphInner {
    source: RefCell<Option<Box<dyn ByteSource>>>,
    nodes: RefCell<HashMap<String, Option<Rc<TypeNode>>>>,
    pub(crate) markers: Markers,
    pub(crate) parameter_names: Box<dyn ParameterNames>,
}

impl TypeGraph {
    pub fn new(source: Box<dyn ByteSource>, options: GraphOptions) -> Self {
        Self {
            inner: Rc::new(GraphInner {
                source: RefCell::new(Some(source)),
                nodes: RefCell::new(HashMap::new()),
                markers: options.markers,
                parameter_names: options.parameter_names,
            }),
        }
    }

    /// Node for `source_name` (`org.gradle.api.Project`, `a.Outer.Inner`),
    /// or `None` if the source does not provide it.
    pub fn lookup(&self, source_name: &str) -> Result<Option<Rc<TypeNode>>, ModelError> {
        self.inner.lookup(source_name)
    }

    /// Every provided type in source order. Names are snapshotted now, nodes
    /// are produced as the iterator advances.
    pub fn all_types(&self) -> Result<AllTypes, ModelError> {
        let names = {
            let source = self.inner.source.borrow();
            let source = source.as_ref().ok_or(ModelError::Closed)?;
            source
                .class_names()
                .map_err(|err| ModelError::source("<all types>", err))?
        };
        Ok(AllTypes {
            graph: Rc::clone(&self.inner),
            names: names.into_iter(),
            done: false,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.inner.ensure_open().is_err()
    }

    /// Releases the byte source. Closing twice fails with
    /// [`ModelError::Closed`].
    pub fn close(&self) -> Result<(), ModelError> {
        let source = self.inner.source.borrow_mut().take();
        let Some(mut source) = source else {
            return Err(ModelError::Closed);
        };
        let cached = {
            let mut nodes = self.inner.nodes.borrow_mut();
            let cached = nodes.len();
            nodes.clear();
            cached
        };
        source
            .close()
            .map_err(|err| ModelError::source("<close>", err))?;
        tracing::debug!(target = "kext.model", cached, "closed type graph");
        Ok(())
    }
}

impl Drop for TypeGraph {
    fn drop(&mut self) {
        if !self.is_closed() {
            if let Err(err) = self.close() {
                tracing::warn!(target = "kext.model", error = %err, "failed to close type graph");
            }
        }
    }
}

impl fmt::Debug for TypeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeGraph")
            .field("closed", &self.is_closed())
            .field("cached", &self.inner.nodes.borrow().len())
            .finish()
    }
}

impl GraphInner {
    pub(crate) fn ensure_open(&self) -> Result<(), ModelError> {
        if self.source.borrow().is_some() {
            Ok(())
        } else {
            Err(ModelError::Closed)
        }
    }

    pub(crate) fn lookup(
        self: &Rc<Self>,
        source_name: &str,
    ) -> Result<Option<Rc<TypeNode>>, ModelError> {
        let bytes = {
            let source = self.source.borrow();
            let source = source.as_ref().ok_or(ModelError::Closed)?;
            if let Some(cached) = self.nodes.borrow().get(source_name) {
                return Ok(cached.clone());
            }
            source
                .class_bytes(source_name)
                .map_err(|err| ModelError::source(source_name, err))?
        };

        if bytes.is_none() {
            tracing::trace!(target = "kext.model", name = source_name, "type not on classpath");
        }
        let node = bytes.map(|bytes| {
            Rc::new(TypeNode::new(
                source_name.to_string(),
                bytes,
                Rc::downgrade(self),
            ))
        });
        self.nodes
            .borrow_mut()
            .insert(source_name.to_string(), node.clone());
        Ok(node)
    }
}

/// Iterator returned by [`TypeGraph::all_types`].
///
/// Yields a single [`ModelError::Closed`] and then ends if the graph is
/// closed mid-iteration.
pub struct AllTypes {
    graph: Rc<GraphInner>,
    names: std::vec::IntoIter<String>,
    done: bool,
}

impl Iterator for AllTypes {
    type Item = Result<Rc<TypeNode>, ModelError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let name = self.names.next()?;
            match self.graph.lookup(&name) {
                Ok(Some(node)) => return Some(Ok(node)),
                Ok(None) => continue,
                Err(err) => {
                    if matches!(err, ModelError::Closed) {
                        self.done = true;
                    }
                    return Some(Err(err));
                }
            }
        }
    }
}
