mod selection_errors;
