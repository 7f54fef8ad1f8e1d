// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Stored routine names and read queries.
//!
//! Routine argument order is fixed by the database definitions; handlers
//! pass arguments in the order documented on each constant.

// =============================================================================
// Session
// =============================================================================

/// `(id, password) -> 1 | 0`
pub const LOGIN_PROFESSOR: &str = "login_profesor";
/// `(id, password) -> 1 | 0`
pub const LOGIN_STUDENT: &str = "login_estudiante";

// =============================================================================
// Exams
// =============================================================================

/// `(name, description, question_count, time_limit, course_id, professor_id) -> exam id`
pub const CREATE_EXAM: &str = "agregar_examen";
/// `(exam_id, name, description, question_count, time_limit, course_id, professor_id) -> rows`
pub const UPDATE_EXAM: &str = "actualizar_examen";
/// `(exam_id) -> 0` when the exam is assigned to a schedule
pub const DELETE_EXAM: &str = "eliminar_examen";
/// `(student_id, exam_id, presented_at, time_taken, ip_address, answers) -> presentation id`
pub const STORE_PRESENTATION: &str = "almacenar_presentacion_examen";

// =============================================================================
// Questions
// =============================================================================

/// `(text, options, correct_answers, type_id, topic, privacy) -> question id`
pub const CREATE_QUESTION: &str = "insertar_pregunta";
/// `(question_id, text, options, correct_answers, type_id, topic, privacy)`
pub const UPDATE_QUESTION: &str = "actualizar_pregunta";
/// `(question_id, professor_id, privacy) -> 1` on success
pub const UPDATE_QUESTION_PRIVACY: &str = "actualizar_privacidad_pregunta";
/// `(question_id) -> 1` on success, otherwise assigned to exams
pub const DELETE_QUESTION: &str = "eliminar_pregunta";

// =============================================================================
// Students, professors, groups
// =============================================================================

/// `(id, name, password) -> bool`
pub const CREATE_STUDENT: &str = "crear_estudiante";
/// `(id, name, password) -> bool`
pub const UPDATE_STUDENT: &str = "actualizar_estudiante";
/// `(id) -> bool`
pub const DELETE_STUDENT: &str = "eliminar_estudiante";

/// `(id, name, password) -> bool`
pub const CREATE_PROFESSOR: &str = "crear_profesor";
/// `(id, name, password) -> bool`
pub const UPDATE_PROFESSOR: &str = "actualizar_profesor";
/// `(id) -> bool`
pub const DELETE_PROFESSOR: &str = "eliminar_profesor";

/// `(id, name) -> bool`
pub const CREATE_GROUP: &str = "crear_grupo";
/// `(id, name) -> bool`
pub const UPDATE_GROUP: &str = "actualizar_grupo";
/// `(id) -> bool`
pub const DELETE_GROUP: &str = "eliminar_grupo";
/// `(student_id, group_id) -> status text`
pub const ADD_STUDENT_TO_GROUP: &str = "crear_estudiantes_grupo";

/// Status text returned by [`ADD_STUDENT_TO_GROUP`] on success.
pub const STUDENT_ADDED: &str = "Estudiante Agregado";

// =============================================================================
// Read queries
// =============================================================================

pub const LINK_QUESTION_TO_EXAM: &str = "\
    INSERT INTO examen_pregunta (id_examen, id_pregunta) \
    VALUES (:exam_id, :question_id)";

pub const EXAM_QUESTIONS: &str = "\
    SELECT p.* \
    FROM pregunta p \
    JOIN examen_pregunta ep ON p.id_pregunta = ep.id_pregunta \
    WHERE ep.id_examen = :exam_id";

const SCHEDULE_COLUMNS: &str = "\
    SELECT h.*, \
        CASE WHEN gh.id_grupo IS NOT NULL THEN 'SI' ELSE 'NO' END AS grupo_asociado, \
        CASE WHEN eh.id_examen IS NOT NULL THEN 'SI' ELSE 'NO' END AS examen_asociado \
    FROM horario h \
    LEFT JOIN grupo_horario gh ON h.id_horario = gh.id_horario \
    LEFT JOIN examen_horario eh ON h.id_horario = eh.id_horario";

/// Schedules for one week of a semester, with group/exam association flags.
pub fn schedules_by_week() -> String {
    format!(
        "{SCHEDULE_COLUMNS} \
         WHERE h.semana = :week AND h.semestre = :semester \
         ORDER BY h.indice_dia, h.hora, h.semestre ASC"
    )
}

/// Schedules assigned to a group.
pub fn group_schedule() -> String {
    format!("{SCHEDULE_COLUMNS} WHERE gh.id_grupo = :group_id")
}

pub const SEMESTERS: &str = "\
    SELECT semestre, COUNT(DISTINCT semana) AS semanas \
    FROM horario \
    GROUP BY semestre \
    ORDER BY semestre ASC";

pub const GROUP_STUDENTS: &str = "\
    SELECT e.* \
    FROM estudiante e \
    JOIN estudiante_grupo eg ON e.id_estudiante = eg.id_estudiante \
    WHERE eg.id_grupo = :group_id";

const QUESTION_COLUMNS: &str = "\
    SELECT p.id_pregunta, p.texto, p.opciones, p.respuestas_correctas, p.id_tipo, p.tema, \
        CASE WHEN p.privacidad = 0 THEN 'PUBLICA' \
             WHEN p.privacidad = 1 THEN 'PRIVADA' \
             ELSE 'DESCONOCIDA' END AS privacidad \
    FROM pregunta p \
    INNER JOIN examen_pregunta ep ON p.id_pregunta = ep.id_pregunta \
    INNER JOIN examen e ON ep.id_examen = e.id_examen";

/// Public questions on a topic plus the professor's own questions on it.
pub fn question_bank() -> String {
    format!(
        "{QUESTION_COLUMNS} \
         WHERE (p.tema = :topic AND p.privacidad = 0) \
            OR (p.tema = :topic AND e.id_profesor = :professor_id) \
         ORDER BY p.texto"
    )
}

/// The professor's own questions on a topic.
pub fn professor_questions_by_topic() -> String {
    format!(
        "{QUESTION_COLUMNS} \
         WHERE p.tema = :topic AND e.id_profesor = :professor_id \
         ORDER BY p.texto"
    )
}

/// Every question the professor owns.
pub fn professor_questions() -> String {
    format!("{QUESTION_COLUMNS} WHERE e.id_profesor = :professor_id ORDER BY p.texto")
}
