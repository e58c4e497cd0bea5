//! The names a generated component may use without importing them.
//!
//! Everything a component can reach is listed in [`AmbientRegistry`]; the
//! script engine binds exactly these entries as locals of the evaluated unit
//! and nothing else is injected.

/// What an ambient name resolves to inside the script engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// A member of the element runtime (`createElement`, hooks, ...).
    Runtime,
    /// A kit component rendered as a host element with a fixed tag.
    Primitive { tag: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientEntry {
    pub name: &'static str,
    pub capability: Capability,
}

const RUNTIME_NAMES: [&str; 14] = [
    "React",
    "createElement",
    "Fragment",
    "useState",
    "useEffect",
    "useLayoutEffect",
    "useRef",
    "useMemo",
    "useCallback",
    "useReducer",
    "useContext",
    "createContext",
    "forwardRef",
    "memo",
];

const KIT_PRIMITIVES: [(&str, &str); 10] = [
    ("Card", "div"),
    ("CardHeader", "div"),
    ("CardTitle", "h3"),
    ("CardDescription", "p"),
    ("CardFooter", "div"),
    ("Button", "button"),
    ("Input", "input"),
    ("TextArea", "textarea"),
    ("Text", "span"),
    ("Terminal", "pre"),
];

#[derive(Debug, Clone)]
pub struct AmbientRegistry {
    entries: Vec<AmbientEntry>,
}

impl AmbientRegistry {
    /// An empty registry; components evaluated against it see no ambient names.
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// The element runtime plus the kit primitives.
    pub fn standard() -> Self {
        let mut registry = Self::empty();
        for name in RUNTIME_NAMES {
            registry.register(name, Capability::Runtime);
        }
        for (name, tag) in KIT_PRIMITIVES {
            registry.register(name, Capability::Primitive { tag });
        }
        registry
    }

    /// Adds or replaces `name`.
    pub fn register(&mut self, name: &'static str, capability: Capability) {
        match self.entries.iter_mut().find(|entry| entry.name == name) {
            Some(entry) => entry.capability = capability,
            None => self.entries.push(AmbientEntry { name, capability }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AmbientEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|entry| entry.name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Script object literal mapping every entry to its runtime value.
    pub fn scope_literal(&self) -> String {
        let fields: Vec<String> = self
            .entries
            .iter()
            .map(|entry| match entry.capability {
                Capability::Runtime => format!("{0}: __nexus.{0}", entry.name),
                Capability::Primitive { tag } => {
                    format!("{0}: __nexus.primitive(\"{0}\", \"{1}\")", entry.name, tag)
                }
            })
            .collect();
        format!("{{ {} }}", fields.join(", "))
    }

    /// `const { a, b } = scope;`, or nothing for an empty registry.
    pub fn destructuring(&self, parameter: &str) -> String {
        if self.entries.is_empty() {
            return String::new();
        }
        let names: Vec<&str> = self.names().collect();
        format!("const {{ {} }} = {parameter};", names.join(", "))
    }
}

impl Default for AmbientRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

/// Element runtime evaluated ahead of every component.
///
/// Elements are plain `{ $$nexus, type, props, children }` records. Hooks
/// return their initial values since a preview renders exactly once.
/// `__nexus.render` resolves function components down to host elements and
/// returns a JSON-ready tree.
pub const RUNTIME_PRELUDE: &str = r#"
var __nexus = (function () {
  var MAX_DEPTH = 64;
  var Fragment = { $$fragment: true };

  function noop() {}

  function flatten(items, out) {
    for (var i = 0; i < items.length; i++) {
      var item = items[i];
      if (Array.isArray(item)) {
        flatten(item, out);
      } else if (item !== null && item !== undefined && item !== false && item !== true) {
        out.push(item);
      }
    }
    return out;
  }

  function createElement(type, props) {
    var children = flatten(Array.prototype.slice.call(arguments, 2), []);
    return { $$nexus: true, type: type, props: props || {}, children: children };
  }

  function childrenProp(children) {
    if (children.length === 0) return undefined;
    if (children.length === 1) return children[0];
    return children;
  }

  function hostProps(props) {
    var out = {};
    for (var key in props) {
      if (key === "children" || key === "key" || key === "ref") continue;
      var value = props[key];
      if (typeof value === "function" || value === undefined) continue;
      out[key] = value;
    }
    return out;
  }

  function resolve(node, depth) {
    if (depth > MAX_DEPTH) throw new Error("render depth exceeded");
    if (node === null || node === undefined || typeof node === "boolean") return [];
    if (typeof node === "string" || typeof node === "number") return [String(node)];
    if (Array.isArray(node)) {
      var list = [];
      for (var i = 0; i < node.length; i++) list = list.concat(resolve(node[i], depth + 1));
      return list;
    }
    if (!node.$$nexus) return [];
    var type = node.type;
    if (type === Fragment) return resolve(node.children, depth + 1);
    if (typeof type === "function") {
      var props = {};
      for (var key in node.props) props[key] = node.props[key];
      var children = childrenProp(node.children);
      if (children !== undefined) props.children = children;
      return resolve(type(props, null), depth + 1);
    }
    if (typeof type !== "string") throw new Error("invalid element type: " + typeof type);
    return [{ tag: type, props: hostProps(node.props), children: resolve(node.children, depth + 1) }];
  }

  function render(component) {
    var nodes = resolve(createElement(component, null), 0);
    if (nodes.length === 1) return nodes[0];
    return { tag: "fragment", props: {}, children: nodes };
  }

  function useState(initial) {
    return [typeof initial === "function" ? initial() : initial, noop];
  }

  function useReducer(reducer, initial, init) {
    return [typeof init === "function" ? init(initial) : initial, noop];
  }

  function useRef(value) {
    return { current: value === undefined ? null : value };
  }

  function useMemo(factory) {
    return factory();
  }

  function useCallback(callback) {
    return callback;
  }

  function createContext(value) {
    var context = { value: value };
    context.Provider = function (props) {
      return createElement(Fragment, null, props.children);
    };
    context.Consumer = function (props) {
      return typeof props.children === "function" ? props.children(context.value) : null;
    };
    return context;
  }

  function useContext(context) {
    return context ? context.value : undefined;
  }

  function forwardRef(renderFn) {
    return function (props) {
      return renderFn(props, null);
    };
  }

  function memo(component) {
    return component;
  }

  function primitive(name, tag) {
    var component = function (props) {
      var hostPropsWithKit = {};
      for (var key in props) hostPropsWithKit[key] = props[key];
      hostPropsWithKit["data-kit"] = name;
      return createElement(tag, hostPropsWithKit, props.children);
    };
    component.displayName = name;
    return component;
  }

  var api = {
    createElement: createElement,
    Fragment: Fragment,
    useState: useState,
    useEffect: noop,
    useLayoutEffect: noop,
    useRef: useRef,
    useMemo: useMemo,
    useCallback: useCallback,
    useReducer: useReducer,
    useContext: useContext,
    createContext: createContext,
    forwardRef: forwardRef,
    memo: memo
  };
  api.React = api;
  api.primitive = primitive;
  api.render = render;
  return api;
})();
"#;
