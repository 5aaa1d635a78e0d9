use std::sync::Arc;

use tracing::trace;
use windows::core::{Interface, BSTR, HRESULT, VARIANT};
use windows::Win32::Foundation::HWND;
use windows::Win32::System::Com::{
    CoCreateInstance, SafeArrayAccessData, SafeArrayDestroy, SafeArrayGetLBound,
    SafeArrayGetUBound, SafeArrayUnaccessData, CLSCTX_INPROC_SERVER,
};
use windows::Win32::UI::Accessibility::{
    CUIAutomation, IUIAutomation, IUIAutomationCondition, IUIAutomationElement,
    IUIAutomationElementArray, IUIAutomationInvokePattern, IUIAutomationSelectionItemPattern,
    PropertyConditionFlags_IgnoreCase, TreeScope, TreeScope_Children, TreeScope_Descendants,
    UIA_ButtonControlTypeId, UIA_ClassNamePropertyId, UIA_ControlTypePropertyId,
    UIA_InvokePatternId, UIA_NamePropertyId, UIA_SelectionItemPatternId, UIA_TabItemControlTypeId,
};

use tabscan_core::domain::WindowHandle;
use tabscan_core::ports::{
    ControlRole, NameMatch, NodeError, NodeFilter, NodeIdentity, NodeRef, ProbeOutcome, UiNode,
};

/// The provider reports this HRESULT once an element disappeared.
const UIA_E_ELEMENTNOTAVAILABLE: HRESULT = HRESULT(0x8004_0201u32 as i32);

fn map_error(error: windows::core::Error) -> NodeError {
    if error.code() == UIA_E_ELEMENTNOTAVAILABLE {
        NodeError::Stale
    } else {
        NodeError::Backend {
            message: error.to_string(),
        }
    }
}

fn is_element_not_available(error: &windows::core::Error) -> bool {
    error.code() == UIA_E_ELEMENTNOTAVAILABLE
}

/// One UI Automation COM connection. Cheap to create; each backend call
/// builds its own on the calling thread.
pub(crate) struct UiaSession {
    automation: IUIAutomation,
}

impl UiaSession {
    pub(crate) fn new() -> Result<Self, NodeError> {
        let automation: IUIAutomation =
            unsafe { CoCreateInstance(&CUIAutomation, None, CLSCTX_INPROC_SERVER) }
                .map_err(map_error)?;
        Ok(Self { automation })
    }

    pub(crate) fn element_from_window(self, handle: WindowHandle) -> Result<NodeRef, NodeError> {
        let hwnd = HWND(handle.0 as usize as *mut core::ffi::c_void);
        let element = unsafe { self.automation.ElementFromHandle(hwnd) }.map_err(map_error)?;
        Ok(Arc::new(UiaNode {
            automation: Arc::new(self.automation),
            element,
        }))
    }
}

/// One UIA element plus the automation instance that produced it, kept
/// around for building query conditions.
pub(crate) struct UiaNode {
    automation: Arc<IUIAutomation>,
    element: IUIAutomationElement,
}

// UIA interfaces obtained on MTA threads stay usable from any thread; every
// calling thread is joined to the MTA first (see com.rs).
unsafe impl Send for UiaNode {}
unsafe impl Sync for UiaNode {}

fn control_type_id(role: ControlRole) -> i32 {
    match role {
        ControlRole::TabItem => UIA_TabItemControlTypeId.0,
        ControlRole::Button => UIA_ButtonControlTypeId.0,
        // Never queried for; no UIA id maps back to it.
        ControlRole::Other => 0,
    }
}

impl UiaNode {
    fn wrap(&self, element: IUIAutomationElement) -> NodeRef {
        Arc::new(UiaNode {
            automation: self.automation.clone(),
            element,
        })
    }

    /// OR-combine a group of conditions; `None` for an empty group.
    fn any_of(
        &self,
        mut conditions: Vec<IUIAutomationCondition>,
    ) -> Result<Option<IUIAutomationCondition>, NodeError> {
        let Some(mut combined) = conditions.pop() else {
            return Ok(None);
        };
        for condition in conditions {
            combined = unsafe { self.automation.CreateOrCondition(&combined, &condition) }
                .map_err(map_error)?;
        }
        Ok(Some(combined))
    }

    /// AND-combine the populated filter fields into one UIA condition;
    /// `None` for an unconstrained filter.
    fn build_condition(
        &self,
        filter: &NodeFilter,
    ) -> Result<Option<IUIAutomationCondition>, NodeError> {
        let mut groups: Vec<IUIAutomationCondition> = Vec::new();

        if let Some(role) = filter.role {
            let condition = unsafe {
                self.automation.CreatePropertyCondition(
                    UIA_ControlTypePropertyId,
                    &VARIANT::from(control_type_id(role)),
                )
            }
            .map_err(map_error)?;
            groups.push(condition);
        }

        let class_parts = filter
            .classes
            .iter()
            .map(|class| {
                unsafe {
                    self.automation.CreatePropertyCondition(
                        UIA_ClassNamePropertyId,
                        &VARIANT::from(BSTR::from(class.as_str())),
                    )
                }
                .map_err(map_error)
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(classes) = self.any_of(class_parts)? {
            groups.push(classes);
        }

        let name_parts = filter
            .names
            .iter()
            .map(|matcher| match matcher {
                NameMatch::Exact(name) => unsafe {
                    self.automation.CreatePropertyCondition(
                        UIA_NamePropertyId,
                        &VARIANT::from(BSTR::from(name.as_str())),
                    )
                }
                .map_err(map_error),
                NameMatch::CaseInsensitive(name) => unsafe {
                    self.automation.CreatePropertyConditionEx(
                        UIA_NamePropertyId,
                        &VARIANT::from(BSTR::from(name.as_str())),
                        PropertyConditionFlags_IgnoreCase,
                    )
                }
                .map_err(map_error),
            })
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(names) = self.any_of(name_parts)? {
            groups.push(names);
        }

        let mut groups = groups.into_iter();
        let Some(mut combined) = groups.next() else {
            return Ok(None);
        };
        for condition in groups {
            combined = unsafe { self.automation.CreateAndCondition(&combined, &condition) }
                .map_err(map_error)?;
        }
        Ok(Some(combined))
    }

    fn find(&self, scope: TreeScope, filter: &NodeFilter) -> Result<Vec<NodeRef>, NodeError> {
        let condition = match self.build_condition(filter)? {
            Some(condition) => condition,
            None => unsafe { self.automation.CreateTrueCondition() }.map_err(map_error)?,
        };
        let found = unsafe { self.element.FindAll(scope, &condition) }.map_err(map_error)?;
        self.collect(found)
    }

    fn collect(&self, array: IUIAutomationElementArray) -> Result<Vec<NodeRef>, NodeError> {
        unsafe {
            let length = array.Length().map_err(map_error)?;
            let mut nodes = Vec::with_capacity(length as usize);
            for index in 0..length {
                match array.GetElement(index) {
                    Ok(element) => nodes.push(self.wrap(element)),
                    Err(error) => trace!(%error, "element dropped out of a query result"),
                }
            }
            Ok(nodes)
        }
    }
}

impl UiNode for UiaNode {
    fn name(&self) -> Result<String, NodeError> {
        unsafe { self.element.CurrentName() }
            .map(|name| name.to_string())
            .map_err(map_error)
    }

    fn class_name(&self) -> Result<String, NodeError> {
        unsafe { self.element.CurrentClassName() }
            .map(|class| class.to_string())
            .map_err(map_error)
    }

    fn role(&self) -> Result<ControlRole, NodeError> {
        let id = unsafe { self.element.CurrentControlType() }.map_err(map_error)?;
        if id == UIA_TabItemControlTypeId {
            Ok(ControlRole::TabItem)
        } else if id == UIA_ButtonControlTypeId {
            Ok(ControlRole::Button)
        } else {
            Ok(ControlRole::Other)
        }
    }

    fn identity(&self) -> Result<NodeIdentity, NodeError> {
        unsafe {
            let array = self.element.GetRuntimeId().map_err(map_error)?;
            if array.is_null() {
                return Err(NodeError::Backend {
                    message: "identifiant d'exécution indisponible".to_string(),
                });
            }

            // The runtime id is a SAFEARRAY of i32.
            let read = (|| -> windows::core::Result<Vec<i32>> {
                let lower = SafeArrayGetLBound(array, 1)?;
                let upper = SafeArrayGetUBound(array, 1)?;
                if upper < lower {
                    return Ok(Vec::new());
                }
                let mut data: *mut core::ffi::c_void = std::ptr::null_mut();
                SafeArrayAccessData(array, &mut data)?;
                let values =
                    std::slice::from_raw_parts(data as *const i32, (upper - lower + 1) as usize)
                        .to_vec();
                SafeArrayUnaccessData(array)?;
                Ok(values)
            })();
            let _ = SafeArrayDestroy(array);

            read.map(NodeIdentity).map_err(map_error)
        }
    }

    fn children(&self) -> Result<Vec<NodeRef>, NodeError> {
        let condition = unsafe { self.automation.CreateTrueCondition() }.map_err(map_error)?;
        let found =
            unsafe { self.element.FindAll(TreeScope_Children, &condition) }.map_err(map_error)?;
        self.collect(found)
    }

    fn find_descendants(&self, filter: &NodeFilter) -> Result<Vec<NodeRef>, NodeError> {
        self.find(TreeScope_Descendants, filter)
    }

    fn find_children(&self, filter: &NodeFilter) -> Result<Vec<NodeRef>, NodeError> {
        self.find(TreeScope_Children, filter)
    }

    fn selected(&self) -> Result<Option<bool>, NodeError> {
        let pattern = match unsafe { self.element.GetCurrentPattern(UIA_SelectionItemPatternId) } {
            Ok(pattern) => pattern,
            Err(error) if is_element_not_available(&error) => return Err(NodeError::Stale),
            // Absence of the pattern is a regular outcome.
            Err(_) => return Ok(None),
        };
        let pattern: IUIAutomationSelectionItemPattern = pattern.cast().map_err(map_error)?;
        let selected = unsafe { pattern.CurrentIsSelected() }.map_err(map_error)?;
        Ok(Some(selected.as_bool()))
    }

    fn select(&self) -> Result<ProbeOutcome, NodeError> {
        let pattern = match unsafe { self.element.GetCurrentPattern(UIA_SelectionItemPatternId) } {
            Ok(pattern) => pattern,
            Err(error) if is_element_not_available(&error) => return Err(NodeError::Stale),
            Err(_) => return Ok(ProbeOutcome::Unsupported),
        };
        let pattern: IUIAutomationSelectionItemPattern = pattern.cast().map_err(map_error)?;
        unsafe { pattern.Select() }.map_err(map_error)?;
        Ok(ProbeOutcome::Applied)
    }

    fn invoke(&self) -> Result<ProbeOutcome, NodeError> {
        let pattern = match unsafe { self.element.GetCurrentPattern(UIA_InvokePatternId) } {
            Ok(pattern) => pattern,
            Err(error) if is_element_not_available(&error) => return Err(NodeError::Stale),
            Err(_) => return Ok(ProbeOutcome::Unsupported),
        };
        let pattern: IUIAutomationInvokePattern = pattern.cast().map_err(map_error)?;
        unsafe { pattern.Invoke() }.map_err(map_error)?;
        Ok(ProbeOutcome::Applied)
    }
}
