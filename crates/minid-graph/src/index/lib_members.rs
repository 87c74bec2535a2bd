//! Member names defined by the JavaScript runtime and the DOM.
//!
//! A project member that shares one of these spellings may be reached
//! structurally through a built-in type (`Iterable`, `PromiseLike`,
//! `EventTarget`, ...), so it is never renamed.

use std::sync::LazyLock;

use rustc_hash::FxHashSet;

const LIB_MEMBERS: &[&str] = &[
    // Object.prototype
    "constructor", "hasOwnProperty", "isPrototypeOf", "propertyIsEnumerable",
    "toLocaleString", "toString", "valueOf", "__proto__", "prototype",
    // Function.prototype
    "apply", "bind", "call", "length", "name", "arguments", "caller",
    // Array.prototype
    "at", "concat", "copyWithin", "entries", "every", "fill", "filter", "find",
    "findIndex", "findLast", "findLastIndex", "flat", "flatMap", "forEach",
    "includes", "indexOf", "join", "keys", "lastIndexOf", "map", "pop", "push",
    "reduce", "reduceRight", "reverse", "shift", "slice", "some", "sort",
    "splice", "toReversed", "toSorted", "toSpliced", "unshift", "values", "with",
    // String.prototype
    "charAt", "charCodeAt", "codePointAt", "endsWith", "localeCompare", "match",
    "matchAll", "normalize", "padEnd", "padStart", "repeat", "replace",
    "replaceAll", "search", "split", "startsWith", "substring", "substr",
    "toLowerCase", "toUpperCase", "toLocaleLowerCase", "toLocaleUpperCase",
    "trim", "trimEnd", "trimStart", "raw",
    // Number, Math, Date
    "toFixed", "toExponential", "toPrecision", "getTime", "getFullYear",
    "getMonth", "getDate", "getDay", "getHours", "getMinutes", "getSeconds",
    "getMilliseconds", "toISOString", "toJSON", "now", "parse", "stringify",
    // Promise / iteration / async
    "then", "catch", "finally", "next", "return", "throw", "done", "value",
    "resolve", "reject", "all", "allSettled", "any", "race",
    // Map / Set / WeakMap / WeakRef
    "get", "set", "has", "delete", "clear", "add", "size", "deref",
    // Error
    "message", "stack", "cause", "errors",
    // RegExp
    "exec", "test", "lastIndex", "source", "flags", "global", "index", "input",
    "groups",
    // Typed arrays and buffers
    "buffer", "byteLength", "byteOffset", "subarray", "getUint8", "setUint8",
    // Proxy / Reflect handler traps
    "construct", "defineProperty", "deleteProperty", "getOwnPropertyDescriptor",
    "getPrototypeOf", "setPrototypeOf", "ownKeys", "preventExtensions",
    "isExtensible",
    // Property descriptors
    "configurable", "enumerable", "writable",
    // Events and DOM
    "addEventListener", "removeEventListener", "dispatchEvent", "handleEvent",
    "preventDefault", "stopPropagation", "stopImmediatePropagation", "target",
    "currentTarget", "type", "detail", "key", "code", "data", "bubbles",
    "cancelable", "timeStamp", "document", "window", "body", "head", "style",
    "className", "classList", "id", "innerHTML", "textContent", "children",
    "parentNode", "parentElement", "appendChild", "removeChild", "insertBefore",
    "replaceChild", "cloneNode", "getAttribute", "setAttribute",
    "removeAttribute", "querySelector", "querySelectorAll", "getElementById",
    "createElement", "connectedCallback", "disconnectedCallback",
    "attributeChangedCallback", "adoptedCallback", "observedAttributes",
    "shadowRoot", "attachShadow", "focus", "blur", "click", "checked",
    "disabled", "href", "src", "width", "height", "left", "top", "right",
    "bottom", "status", "statusText", "ok", "headers", "method", "json",
    "text", "signal", "abort", "aborted", "url", "mode", "credentials",
    "cache", "redirect", "referrer", "integrity", "keepalive",
    // Node.js streams and emitters
    "on", "once", "off", "emit", "pipe", "write", "end", "read", "close",
    "destroy", "listeners", "removeAllListeners", "setMaxListeners",
    // Disposables
    "dispose",
    // Common lifecycle hooks of structural host contracts
    "render", "setState", "state", "props", "context", "ref", "current",
];

static NAMES: LazyLock<FxHashSet<&'static str>> =
    LazyLock::new(|| LIB_MEMBERS.iter().copied().collect());

pub fn is_lib_member(name: &str) -> bool {
    NAMES.contains(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knows_iteration_protocol_names() {
        assert!(is_lib_member("next"));
        assert!(is_lib_member("then"));
        assert!(is_lib_member("length"));
        assert!(!is_lib_member("computeTotals"));
    }
}
